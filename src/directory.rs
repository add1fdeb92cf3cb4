//! Recipient resolution.
//!
//! Which people to notify for a site is owned by the surrounding system; the
//! pipeline only needs a lookup. The bundled implementation serves a static
//! mapping from the config file.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::config::RecipientEntry;
use crate::router::Recipient;

/// Resolves the recipients to notify for a site
#[async_trait]
pub trait RecipientDirectory: Send + Sync {
    async fn recipients_for_site(&self, site_id: &str) -> Vec<Recipient>;
}

/// Directory backed by the static recipient entries in the config file
#[derive(Debug, Default)]
pub struct StaticDirectory {
    by_site: HashMap<String, Vec<Recipient>>,
}

impl StaticDirectory {
    pub fn new(entries: &[RecipientEntry]) -> Self {
        let mut by_site: HashMap<String, Vec<Recipient>> = HashMap::new();

        for entry in entries {
            for site_id in &entry.site_ids {
                by_site
                    .entry(site_id.clone())
                    .or_default()
                    .push(entry.recipient.clone());
            }
        }

        Self { by_site }
    }
}

#[async_trait]
impl RecipientDirectory for StaticDirectory {
    async fn recipients_for_site(&self, site_id: &str) -> Vec<Recipient> {
        self.by_site.get(site_id).cloned().unwrap_or_default()
    }
}
