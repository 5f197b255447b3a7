use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/*-------------------------------------------------------------------------------------------------
  Category
-------------------------------------------------------------------------------------------------*/

/// Classification tag attached to a source (or overridden per prefix), e.g. `crawler` or
/// `datacenter`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Category {
    pub id: String,
    pub description: String,
}

/*--------------------------------------------------------------------------------------
  Category Catalog
--------------------------------------------------------------------------------------*/

const CATALOG: [(&str, &str); 19] = [
    ("crawler", "IP ranges used by web crawlers and bots"),
    ("residential", "IP ranges assigned to residential users by ISPs"),
    ("business", "IP ranges assigned to businesses"),
    ("mobile", "IP ranges used by mobile carriers for their data services"),
    ("datacenter", "IP ranges belonging to data centers and hosting providers"),
    ("education", "IP ranges assigned to educational institutions"),
    ("government", "IP ranges used by government agencies"),
    ("healthcare", "IP ranges used by healthcare providers"),
    ("cdn", "IP ranges used by content delivery networks"),
    ("isp", "IP ranges owned by internet service providers"),
    ("vpn", "IP ranges used by VPN and proxy services"),
    ("spam", "IP ranges identified as sources of spam activity"),
    ("malicious", "IP ranges identified as sources of malicious activity"),
    ("private", "Non-routable IP ranges used for private networks"),
    ("iot", "IP ranges used by Internet of Things devices"),
    ("telecom", "IP ranges used by telecommunications companies"),
    ("rnd", "IP ranges used by research and development networks"),
    ("social", "IP ranges belonging to social media platforms"),
    ("gaming", "IP ranges used by online gaming platforms"),
];

lazy_static! {
    static ref CATEGORIES: Vec<Category> = CATALOG
        .iter()
        .map(|(id, description)| Category {
            id: id.to_string(),
            description: description.to_string(),
        })
        .collect();
}

impl Category {
    /// Look up a catalog category by its `id`.
    pub fn by_id(id: &str) -> Option<Category> {
        CATEGORIES.iter().find(|category| category.id == id).cloned()
    }
}

/// The full, fixed category catalog in its canonical order.
pub fn categories() -> &'static [Category] {
    &CATEGORIES
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
