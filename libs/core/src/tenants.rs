use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Campaign uuid to Streamlabs access token. Built once at startup and only
/// read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct CampaignTokens(BTreeMap<String, String>);

impl CampaignTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, campaign: impl Into<String>, token: impl Into<String>) {
        self.0.insert(campaign.into(), token.into());
    }

    /// Token for a campaign; `None` means the campaign is not supported.
    pub fn token_for(&self, campaign: &str) -> Option<&str> {
        self.0
            .get(campaign)
            .map(String::as_str)
            .filter(|token| !token.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn campaigns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Parses `uuid=token,uuid=token`. Blank segments are skipped; a segment
    /// without `=` is reported back as the error.
    pub fn parse_pairs(input: &str) -> Result<Self, String> {
        let mut tokens = Self::new();
        for segment in input.split(',') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (campaign, token) = segment
                .split_once('=')
                .ok_or_else(|| segment.to_string())?;
            tokens.insert(campaign.trim(), token.trim());
        }
        Ok(tokens)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CampaignTokens {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_and_unknown() {
        let tokens: CampaignTokens = [("830a1280", "test-token")].into_iter().collect();
        assert_eq!(tokens.token_for("830a1280"), Some("test-token"));
        assert_eq!(tokens.token_for("nope"), None);
        assert_eq!(tokens.token_for(""), None);
    }

    #[test]
    fn empty_token_counts_as_unsupported() {
        let tokens: CampaignTokens = [("c1", "")].into_iter().collect();
        assert_eq!(tokens.token_for("c1"), None);
    }

    #[test]
    fn parse_pairs_reads_list() {
        let tokens = CampaignTokens::parse_pairs(" c1 = t1 ,, c2=t2 ").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens.token_for("c1"), Some("t1"));
        assert_eq!(tokens.token_for("c2"), Some("t2"));
    }

    #[test]
    fn parse_pairs_rejects_missing_separator() {
        let err = CampaignTokens::parse_pairs("c1=t1,broken").unwrap_err();
        assert_eq!(err, "broken");
    }
}
