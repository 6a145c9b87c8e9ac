use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Transport {
    Ssh,
    Https,
    Unknown,
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Ssh => write!(f, "SSH"),
            Transport::Https => write!(f, "HTTPS"),
            Transport::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remote {
    pub name: String,
    pub url: String,
    pub host: String,
    pub transport: Transport,
}

impl Remote {
    pub fn from_url(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            host: super::parse::extract_host(url),
            transport: super::parse::classify_transport(url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchStatus {
    pub name: String,
    pub detached: bool,
    pub upstream: Option<String>,
    pub ahead: usize,
    pub behind: usize,
    pub dirty: bool,
}

/// Outcome of classifying `git log --show-signature` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SignatureState {
    NoHistory,
    Unknown,
    Good,
    Bad,
    Expired,
    Unclear,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureStatus {
    pub state: SignatureState,
    pub present: bool,
    pub valid: Option<bool>,
    pub key_info: Option<String>,
}

impl SignatureStatus {
    pub fn from_state(state: SignatureState, key_info: Option<String>) -> Self {
        let (present, valid) = match state {
            SignatureState::Good => (true, Some(true)),
            SignatureState::Bad | SignatureState::Expired => (true, Some(false)),
            SignatureState::Unclear => (true, None),
            SignatureState::NoHistory | SignatureState::Unknown | SignatureState::Absent => {
                (false, None)
            }
        };
        Self {
            state,
            present,
            valid,
            key_info,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StagedDelta {
    pub added: u64,
    pub deleted: u64,
}

impl StagedDelta {
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.deleted == 0
    }
}
