//! Digest formatting.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use jobscout_search::Posting;

/// Label used when a posting has no site.
const UNKNOWN_SITE: &str = "Job Board";

/// A rendered message: subject line plus plain-text body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Digest {
    pub subject: String,
    pub text: String,
}

impl Digest {
    /// Render a batch of postings, numbered in delivery order.
    pub fn build<Tz>(postings: &[Posting], now: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let mut text = format!("Found {} new postings:\n", postings.len());
        for (i, posting) in postings.iter().enumerate() {
            text.push_str(&format!(
                "\n{}. [{}] {} at {}\n   {}",
                i + 1,
                site_label(posting),
                posting.title,
                posting.company_name(),
                posting.url
            ));
        }

        Self {
            subject: format!("Top {} New Jobs - {}", postings.len(), now.format("%I %p")),
            text,
        }
    }

    /// Render a failed-run report.
    pub fn error<Tz>(message: &str, trace: &str, now: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self {
            subject: format!("Job search error - {}", now.format("%I %p")),
            text: format!("An error occurred: {message}\n\n{trace}"),
        }
    }
}

fn site_label(posting: &Posting) -> String {
    let site = posting.site.trim();
    if site.is_empty() {
        UNKNOWN_SITE.to_uppercase()
    } else {
        site.to_uppercase()
    }
}
