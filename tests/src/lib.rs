use kvstash::RawRepr;

/// Raw-value enum shared by the integration tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    System,
    Light,
    Dark,
}

impl RawRepr for Theme {
    type Raw = i64;

    fn to_raw(&self) -> i64 {
        match self {
            Theme::System => 0,
            Theme::Light => 1,
            Theme::Dark => 2,
        }
    }

    fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(Theme::System),
            1 => Some(Theme::Light),
            2 => Some(Theme::Dark),
            _ => None,
        }
    }
}
