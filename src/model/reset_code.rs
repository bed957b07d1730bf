#[derive(Debug, sqlx::FromRow)]
pub struct ResetCode {
    pub id: u64,
    pub user_id: u64,
    pub code: String,
    pub valid: bool,
}

impl ResetCode {
    /// A code can be redeemed once, and only with the exact value issued.
    pub fn accepts(&self, candidate: &str) -> bool {
        self.valid && self.code == candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(valid: bool) -> ResetCode {
        ResetCode {
            id: 1,
            user_id: 7,
            code: "a1b2c3".into(),
            valid,
        }
    }

    #[test]
    fn accepts_only_matching_valid_code() {
        assert!(code(true).accepts("a1b2c3"));
        assert!(!code(true).accepts("a1b2c4"));
        assert!(!code(false).accepts("a1b2c3"));
    }
}
