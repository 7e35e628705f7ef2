//! Query planning.
//!
//! The planner is a pure generator. It knows nothing about quotas; the
//! orchestrator decides how far to consume it and attaches the requested
//! result count to each query as it goes.

use std::collections::HashSet;

use crate::{Phase, SearchProfile};

/// One query in planned order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedQuery {
    pub phase: Phase,
    pub role: String,
    /// Company chunk restricting this query; empty in the fallback phase.
    pub companies: Vec<String>,
    /// Query string passed to the provider.
    pub query: String,
}

/// Builds the ordered priority-then-fallback query sequence.
#[derive(Debug, Clone)]
pub struct QueryPlanner {
    roles: Vec<String>,
    companies: Vec<String>,
    keyword_filter: String,
    chunk_size: usize,
}

impl QueryPlanner {
    /// Create a planner. Blank roles and companies are skipped.
    pub fn new(
        roles: &[String],
        companies: &[String],
        required_keywords: &[String],
        excluded_keywords: &[String],
        chunk_size: usize,
    ) -> Self {
        Self {
            roles: non_blank(roles),
            companies: non_blank(companies),
            keyword_filter: keyword_filter(required_keywords, excluded_keywords),
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn from_profile(profile: &SearchProfile) -> Self {
        Self::new(
            &profile.roles,
            &profile.priority_companies,
            &profile.required_keywords,
            &profile.excluded_keywords,
            profile.chunk_size,
        )
    }

    /// Company chunks in list order.
    pub fn chunks(&self) -> impl Iterator<Item = &[String]> + '_ {
        self.companies.chunks(self.chunk_size)
    }

    /// One query per (chunk, role), chunk-major.
    pub fn priority_queries(&self) -> impl Iterator<Item = PlannedQuery> + '_ {
        self.chunks().flat_map(move |chunk| {
            self.roles.iter().map(move |role| PlannedQuery {
                phase: Phase::Priority,
                role: role.clone(),
                companies: chunk.to_vec(),
                query: compose(role, Some(chunk), &self.keyword_filter),
            })
        })
    }

    /// One unrestricted query per role.
    pub fn fallback_queries(&self) -> impl Iterator<Item = PlannedQuery> + '_ {
        self.roles.iter().map(move |role| PlannedQuery {
            phase: Phase::Fallback,
            role: role.clone(),
            companies: Vec::new(),
            query: compose(role, None, &self.keyword_filter),
        })
    }

    /// The full plan. Each call starts a fresh sequence.
    pub fn queries(&self) -> impl Iterator<Item = PlannedQuery> + '_ {
        self.priority_queries().chain(self.fallback_queries())
    }
}

fn non_blank(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Phrase-quote a term. Embedded quotes are dropped so the phrase stays balanced.
fn quote(term: &str) -> String {
    format!("\"{}\"", unquoted(term))
}

fn unquoted(term: &str) -> String {
    term.chars().filter(|c| *c != '"').collect()
}

fn keyword_term(term: &str) -> String {
    if term.chars().any(char::is_whitespace) {
        quote(term)
    } else {
        unquoted(term)
    }
}

/// Required terms as-is, excluded terms prefixed with `-`.
/// Repeated terms appear once.
fn keyword_filter(required: &[String], excluded: &[String]) -> String {
    let mut seen = HashSet::new();
    let mut parts = Vec::new();

    for term in non_blank(required) {
        if seen.insert(("+", term.clone())) {
            parts.push(keyword_term(&term));
        }
    }
    for term in non_blank(excluded) {
        if seen.insert(("-", term.clone())) {
            parts.push(format!("-{}", keyword_term(&term)));
        }
    }

    parts.join(" ")
}

fn compose(role: &str, companies: Option<&[String]>, keyword_filter: &str) -> String {
    let mut parts = vec![quote(role)];

    if let Some(companies) = companies {
        let disjunction = companies
            .iter()
            .map(|c| quote(c))
            .collect::<Vec<_>>()
            .join(" OR ");
        parts.push(format!("({})", disjunction));
    }

    if !keyword_filter.is_empty() {
        parts.push(keyword_filter.to_string());
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_priority_then_fallback_order() {
        let planner = QueryPlanner::new(
            &strings(&["Data Analyst", "BI Analyst"]),
            &strings(&["Acme", "Globex", "Initech"]),
            &[],
            &[],
            2,
        );

        let plan: Vec<_> = planner
            .queries()
            .map(|q| (q.phase, q.role, q.companies))
            .collect();

        assert_eq!(
            plan,
            vec![
                (Phase::Priority, "Data Analyst".to_string(), strings(&["Acme", "Globex"])),
                (Phase::Priority, "BI Analyst".to_string(), strings(&["Acme", "Globex"])),
                (Phase::Priority, "Data Analyst".to_string(), strings(&["Initech"])),
                (Phase::Priority, "BI Analyst".to_string(), strings(&["Initech"])),
                (Phase::Fallback, "Data Analyst".to_string(), Vec::<String>::new()),
                (Phase::Fallback, "BI Analyst".to_string(), Vec::<String>::new()),
            ]
        );
    }

    #[test]
    fn test_query_string_format() {
        let planner = QueryPlanner::new(
            &strings(&["Data Analyst"]),
            &strings(&["Acme", "Globex Corp"]),
            &strings(&["SQL", "power bi"]),
            &strings(&["senior", "unpaid intern"]),
            20,
        );

        let queries: Vec<_> = planner.queries().map(|q| q.query).collect();
        assert_eq!(
            queries,
            vec![
                r#""Data Analyst" ("Acme" OR "Globex Corp") SQL "power bi" -senior -"unpaid intern""#,
                r#""Data Analyst" SQL "power bi" -senior -"unpaid intern""#,
            ]
        );
    }

    #[test]
    fn test_embedded_quotes_are_dropped() {
        let planner = QueryPlanner::new(
            &strings(&["Data \"Analyst\""]),
            &strings(&["Toys \"R\" Us"]),
            &[],
            &strings(&["\"unpaid\" intern", "sr\""]),
            20,
        );

        let queries: Vec<_> = planner.queries().map(|q| q.query).collect();
        assert_eq!(
            queries,
            vec![
                r#""Data Analyst" ("Toys R Us") -"unpaid intern" -sr"#,
                r#""Data Analyst" -"unpaid intern" -sr"#,
            ]
        );
    }

    #[test]
    fn test_repeated_exclusion_appears_once() {
        let planner = QueryPlanner::new(
            &strings(&["Analyst"]),
            &[],
            &[],
            &strings(&["senior", "lead", "senior"]),
            20,
        );

        let query = planner.fallback_queries().next().unwrap().query;
        assert_eq!(query, r#""Analyst" -senior -lead"#);
    }

    #[test]
    fn test_no_companies_means_fallback_only() {
        let planner = QueryPlanner::new(&strings(&["Analyst"]), &[], &[], &[], 20);
        assert_eq!(planner.priority_queries().count(), 0);
        assert_eq!(planner.queries().count(), 1);
    }

    #[test]
    fn test_blank_entries_skipped() {
        let planner = QueryPlanner::new(
            &strings(&["Analyst", " "]),
            &strings(&["", "Acme"]),
            &strings(&[""]),
            &[],
            20,
        );

        let plan: Vec<_> = planner.queries().collect();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].query, r#""Analyst" ("Acme")"#);
        assert_eq!(plan[1].query, r#""Analyst""#);
    }

    #[test]
    fn test_plan_is_restartable() {
        let planner = QueryPlanner::new(
            &strings(&["A", "B"]),
            &strings(&["X", "Y", "Z"]),
            &[],
            &[],
            1,
        );

        let first: Vec<_> = planner.queries().collect();
        let second: Vec<_> = planner.queries().collect();
        assert_eq!(first, second);
    }

    proptest! {
        // Plan length is chunks × roles + roles
        #[test]
        fn plan_length_matches_chunks_and_roles(
            role_count in 1usize..5,
            company_count in 0usize..70,
            chunk_size in 1usize..=20,
        ) {
            let roles: Vec<String> = (0..role_count).map(|i| format!("role {i}")).collect();
            let companies: Vec<String> = (0..company_count).map(|i| format!("co{i}")).collect();
            let planner = QueryPlanner::new(&roles, &companies, &[], &[], chunk_size);

            let chunks = company_count.div_ceil(chunk_size);
            prop_assert_eq!(planner.priority_queries().count(), chunks * role_count);
            prop_assert_eq!(planner.fallback_queries().count(), role_count);
        }

        // Chunks never exceed the chunk size and cover every company in order
        #[test]
        fn chunks_cover_companies_in_order(
            company_count in 0usize..70,
            chunk_size in 1usize..=20,
        ) {
            let companies: Vec<String> = (0..company_count).map(|i| format!("co{i}")).collect();
            let planner = QueryPlanner::new(&strings(&["r"]), &companies, &[], &[], chunk_size);

            let mut flattened = Vec::new();
            for chunk in planner.chunks() {
                prop_assert!(!chunk.is_empty() && chunk.len() <= chunk_size);
                flattened.extend(chunk.iter().cloned());
            }
            prop_assert_eq!(flattened, companies);
        }

        // Every priority query precedes every fallback query
        #[test]
        fn priority_precedes_fallback(
            role_count in 1usize..4,
            company_count in 0usize..30,
        ) {
            let roles: Vec<String> = (0..role_count).map(|i| format!("role {i}")).collect();
            let companies: Vec<String> = (0..company_count).map(|i| format!("co{i}")).collect();
            let planner = QueryPlanner::new(&roles, &companies, &[], &[], 7);

            let phases: Vec<Phase> = planner.queries().map(|q| q.phase).collect();
            let first_fallback = phases.iter().position(|p| *p == Phase::Fallback);
            if let Some(idx) = first_fallback {
                prop_assert!(phases[idx..].iter().all(|p| *p == Phase::Fallback));
            }
        }
    }
}
