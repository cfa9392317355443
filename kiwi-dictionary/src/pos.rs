//! Part-of-speech tag inventory, following the ko-dic tag set.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{KiwiDictionaryError, KiwiDictionaryErrorKind};

/// A part-of-speech tag.
///
/// The numeric discriminants below 64 are reserved so that every tag
/// has a stable default-morpheme slot in the frozen morpheme table
/// (the reserved-ID-range invariant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PosTag {
    Nng = 0,
    Nnp,
    Nnb,
    Np,
    Nr,
    Vv,
    Va,
    /// ㄷ/르/ㅎ/ㅂ/ㅅ-irregular conjugation of a VV stem; regularizes to `Vv`.
    VvIrregular,
    /// Irregular conjugation of a VA stem; regularizes to `Va`.
    VaIrregular,
    Vx,
    Vcp,
    Vcn,
    Mm,
    Mag,
    Maj,
    Ic,
    Jks,
    Jkc,
    Jkg,
    Jko,
    Jkb,
    Jkv,
    Jkq,
    Jx,
    Jc,
    Ep,
    Ef,
    Ec,
    Etn,
    Etm,
    Xpn,
    Xsn,
    Xsv,
    Xsa,
    Xr,
    Sf,
    Sp,
    Ss,
    Se,
    So,
    Sl,
    Sh,
    Sn,
    Nf,
    Nv,
    Na,
    Swk,
    WUrl,
    WEmail,
    WHashtag,
    WMention,
    WSerial,
    User0,
    User1,
    User2,
    User3,
    User4,
}

impl PosTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            PosTag::Nng => "NNG",
            PosTag::Nnp => "NNP",
            PosTag::Nnb => "NNB",
            PosTag::Np => "NP",
            PosTag::Nr => "NR",
            PosTag::Vv => "VV",
            PosTag::Va => "VA",
            PosTag::VvIrregular => "VV-I",
            PosTag::VaIrregular => "VA-I",
            PosTag::Vx => "VX",
            PosTag::Vcp => "VCP",
            PosTag::Vcn => "VCN",
            PosTag::Mm => "MM",
            PosTag::Mag => "MAG",
            PosTag::Maj => "MAJ",
            PosTag::Ic => "IC",
            PosTag::Jks => "JKS",
            PosTag::Jkc => "JKC",
            PosTag::Jkg => "JKG",
            PosTag::Jko => "JKO",
            PosTag::Jkb => "JKB",
            PosTag::Jkv => "JKV",
            PosTag::Jkq => "JKQ",
            PosTag::Jx => "JX",
            PosTag::Jc => "JC",
            PosTag::Ep => "EP",
            PosTag::Ef => "EF",
            PosTag::Ec => "EC",
            PosTag::Etn => "ETN",
            PosTag::Etm => "ETM",
            PosTag::Xpn => "XPN",
            PosTag::Xsn => "XSN",
            PosTag::Xsv => "XSV",
            PosTag::Xsa => "XSA",
            PosTag::Xr => "XR",
            PosTag::Sf => "SF",
            PosTag::Sp => "SP",
            PosTag::Ss => "SS",
            PosTag::Se => "SE",
            PosTag::So => "SO",
            PosTag::Sl => "SL",
            PosTag::Sh => "SH",
            PosTag::Sn => "SN",
            PosTag::Nf => "NF",
            PosTag::Nv => "NV",
            PosTag::Na => "NA",
            PosTag::Swk => "SWK",
            PosTag::WUrl => "W_URL",
            PosTag::WEmail => "W_EMAIL",
            PosTag::WHashtag => "W_HASHTAG",
            PosTag::WMention => "W_MENTION",
            PosTag::WSerial => "W_SERIAL",
            PosTag::User0 => "USER0",
            PosTag::User1 => "USER1",
            PosTag::User2 => "USER2",
            PosTag::User3 => "USER3",
            PosTag::User4 => "USER4",
        }
    }

    /// True for the three sentence-final-punctuation tags used by
    /// sentence splitting (SF = terminal punctuation, SE = ellipsis,
    /// SS = dash/quote used as a sentence break in some conventions).
    pub fn is_sentence_break(&self) -> bool {
        matches!(self, PosTag::Sf | PosTag::Se)
    }

    pub fn is_predicate(&self) -> bool {
        matches!(
            self,
            PosTag::Vv
                | PosTag::Va
                | PosTag::VvIrregular
                | PosTag::VaIrregular
                | PosTag::Vx
                | PosTag::Vcp
                | PosTag::Vcn
        )
    }
}

impl FromStr for PosTag {
    type Err = KiwiDictionaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "NNG" => PosTag::Nng,
            "NNP" => PosTag::Nnp,
            "NNB" => PosTag::Nnb,
            "NP" => PosTag::Np,
            "NR" => PosTag::Nr,
            "VV" => PosTag::Vv,
            "VA" => PosTag::Va,
            "VV-I" => PosTag::VvIrregular,
            "VA-I" => PosTag::VaIrregular,
            "VX" => PosTag::Vx,
            "VCP" => PosTag::Vcp,
            "VCN" => PosTag::Vcn,
            "MM" => PosTag::Mm,
            "MAG" => PosTag::Mag,
            "MAJ" => PosTag::Maj,
            "IC" => PosTag::Ic,
            "JKS" => PosTag::Jks,
            "JKC" => PosTag::Jkc,
            "JKG" => PosTag::Jkg,
            "JKO" => PosTag::Jko,
            "JKB" => PosTag::Jkb,
            "JKV" => PosTag::Jkv,
            "JKQ" => PosTag::Jkq,
            "JX" => PosTag::Jx,
            "JC" => PosTag::Jc,
            "EP" => PosTag::Ep,
            "EF" => PosTag::Ef,
            "EC" => PosTag::Ec,
            "ETN" => PosTag::Etn,
            "ETM" => PosTag::Etm,
            "XPN" => PosTag::Xpn,
            "XSN" => PosTag::Xsn,
            "XSV" => PosTag::Xsv,
            "XSA" => PosTag::Xsa,
            "XR" => PosTag::Xr,
            "SF" => PosTag::Sf,
            "SP" => PosTag::Sp,
            "SS" => PosTag::Ss,
            "SE" => PosTag::Se,
            "SO" => PosTag::So,
            "SL" => PosTag::Sl,
            "SH" => PosTag::Sh,
            "SN" => PosTag::Sn,
            "NF" => PosTag::Nf,
            "NV" => PosTag::Nv,
            "NA" => PosTag::Na,
            "SWK" => PosTag::Swk,
            "W_URL" => PosTag::WUrl,
            "W_EMAIL" => PosTag::WEmail,
            "W_HASHTAG" => PosTag::WHashtag,
            "W_MENTION" => PosTag::WMention,
            "W_SERIAL" => PosTag::WSerial,
            "USER0" => PosTag::User0,
            "USER1" => PosTag::User1,
            "USER2" => PosTag::User2,
            "USER3" => PosTag::User3,
            "USER4" => PosTag::User4,
            other => {
                return Err(KiwiDictionaryErrorKind::Args
                    .with_error(anyhow::anyhow!("unknown POS tag: {}", other)));
            }
        })
    }
}

/// Returns the regular-conjugation counterpart of an irregular tag, if any.
///
/// Only `VvIrregular`/`VaIrregular` have one; a plain `Vv`/`Va` already
/// conjugates regularly and returns `None` here.
pub fn regularize(tag: PosTag) -> Option<PosTag> {
    match tag {
        PosTag::VvIrregular => Some(PosTag::Vv),
        PosTag::VaIrregular => Some(PosTag::Va),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_tag() {
        let tags = [
            PosTag::Nng, PosTag::Nnp, PosTag::Vv, PosTag::Ef, PosTag::Sf,
            PosTag::WUrl, PosTag::User4,
        ];
        for tag in tags {
            let s = tag.as_str();
            let parsed = PosTag::from_str(s).unwrap();
            assert_eq!(parsed, tag);
        }
    }

    #[test]
    fn rejects_unknown_tag() {
        assert!(PosTag::from_str("NOT_A_TAG").is_err());
    }

    #[test]
    fn sentence_break_tags() {
        assert!(PosTag::Sf.is_sentence_break());
        assert!(PosTag::Se.is_sentence_break());
        assert!(!PosTag::Sp.is_sentence_break());
    }

    #[test]
    fn regularize_only_bypasses_genuinely_irregular_tags() {
        assert_eq!(regularize(PosTag::Vv), None);
        assert_eq!(regularize(PosTag::Va), None);
        assert_eq!(regularize(PosTag::VvIrregular), Some(PosTag::Vv));
        assert_eq!(regularize(PosTag::VaIrregular), Some(PosTag::Va));
        assert_eq!(regularize(PosTag::Nng), None);
    }

    #[test]
    fn irregular_tags_round_trip_and_count_as_predicates() {
        assert_eq!(PosTag::from_str("VV-I").unwrap(), PosTag::VvIrregular);
        assert_eq!(PosTag::from_str("VA-I").unwrap(), PosTag::VaIrregular);
        assert!(PosTag::VvIrregular.is_predicate());
        assert!(PosTag::VaIrregular.is_predicate());
    }
}
