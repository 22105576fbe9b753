use serde::{Deserialize, Serialize};

pub const DEFAULT_LANGUAGE: &str = "fr-be";

/// The candidate on whose behalf remote calls are made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub global_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub language: String,
}

impl Identity {
    /// Headers the remote service reads for auditing and translation.
    pub fn headers(&self) -> [(&'static str, &str); 5] {
        [
            ("Accept-Language", self.language.as_str()),
            ("X-User-FirstName", self.first_name.as_str()),
            ("X-User-LastName", self.last_name.as_str()),
            ("X-User-Email", self.email.as_str()),
            ("X-User-GlobalID", self.global_id.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_carry_identity() {
        let identity = Identity {
            global_id: "00012345".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.org".into(),
            language: "en".into(),
        };
        let headers = identity.headers();
        assert!(headers.contains(&("X-User-GlobalID", "00012345")));
        assert!(headers.contains(&("Accept-Language", "en")));
    }
}
