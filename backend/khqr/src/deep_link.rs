//! Deep links that hand a KHQR payload to a banking app.

use url::form_urlencoded;

use crate::bank::Bank;

/// `(scheme and path, query parameter)` pairs tried in order
const ACLEDA_ROUTES: &[(&str, &str)] = &[
    ("acledamobile://khqr/pay", "qr"),
    ("acledamobile://pay/khqr", "qr"),
    ("acledamobile://scan/khqr", "qr"),
    ("acledabankqr://khqr/pay", "qr"),
    ("acledabankqr://pay/khqr", "qr"),
    ("acledabankqr://scan/khqr", "qr"),
    ("acledabankqr://qr", "data"),
    ("acledabankqr://pay", "qr"),
    ("acledamobile://qr", "data"),
    ("acledamobile://pay", "qr"),
    ("acledabank://khqr/scan", "qr"),
    ("acleda://khqr/scan", "qr"),
    ("acledaplay://khqr/scan", "qr"),
];

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DeepLink {
    pub primary: String,
    /// Tried in order when the platform cannot open `primary`
    pub fallbacks: Vec<String>,
}

impl DeepLink {
    /// Returns `None` for banks without a known app scheme
    pub fn for_bank(bank: Bank, khqr: &str) -> Option<Self> {
        let routes = match bank {
            Bank::Acleda => ACLEDA_ROUTES,
            Bank::Aba | Bank::Wing | Bank::Bakong => return None,
        };
        let encoded: String = form_urlencoded::byte_serialize(khqr.as_bytes()).collect();
        let mut links = routes
            .iter()
            .map(|(base, param)| format!("{base}?{param}={encoded}"));
        let primary = links.next()?;
        Some(Self {
            primary,
            fallbacks: links.collect(),
        })
    }

    /// Primary link first, then every fallback
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.fallbacks.iter().map(String::as_str))
    }
}
