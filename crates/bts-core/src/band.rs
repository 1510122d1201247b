use core::fmt;
use serde::Deserialize;

/// GSM frequency band a BTS operates in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum GsmBand {
    #[serde(rename = "GSM450")]
    Gsm450,
    #[serde(rename = "GSM480")]
    Gsm480,
    #[serde(rename = "GSM750")]
    Gsm750,
    #[serde(rename = "GSM810")]
    Gsm810,
    #[serde(rename = "GSM850")]
    Gsm850,
    #[serde(rename = "GSM900")]
    Gsm900,
    #[default]
    #[serde(rename = "GSM1800", alias = "DCS1800")]
    Dcs1800,
    #[serde(rename = "GSM1900", alias = "PCS1900")]
    Pcs1900,
}

impl GsmBand {
    /// Band in MHz, as carried in the PCU INFO indication
    pub fn into_raw(self) -> u16 {
        match self {
            GsmBand::Gsm450 => 450,
            GsmBand::Gsm480 => 480,
            GsmBand::Gsm750 => 750,
            GsmBand::Gsm810 => 810,
            GsmBand::Gsm850 => 850,
            GsmBand::Gsm900 => 900,
            GsmBand::Dcs1800 => 1800,
            GsmBand::Pcs1900 => 1900,
        }
    }
}

impl fmt::Display for GsmBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GsmBand::Dcs1800 => write!(f, "DCS1800"),
            GsmBand::Pcs1900 => write!(f, "PCS1900"),
            other => write!(f, "GSM{}", other.into_raw()),
        }
    }
}
