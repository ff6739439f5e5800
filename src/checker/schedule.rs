// src/checker/schedule.rs
// =============================================================================
// This module runs the probes for one document through a bounded pool.
//
// How it works:
// 1. Group the links into jobs (one job per link, or one per distinct URL
//    when memoizing)
// 2. Turn every job into a future and feed them to buffer_unordered(workers)
// 3. Drain the stream from a single loop: record each result and report
//    progress as results arrive
//
// Because only this loop touches the result list and the progress counter,
// there is nothing to lock. The function returns once every job is done,
// which is the barrier the report builder relies on.
// =============================================================================

use std::collections::HashMap;

use futures::stream::{self, StreamExt};

use super::html::Link;
use super::http::{is_http_url, ProbeOutcome, Prober};

/// How a document's links are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleOptions {
    /// Maximum number of probes in flight at once (must be >= 1)
    pub workers: usize,
    /// Probe each distinct URL once and share the outcome between occurrences
    pub memoize: bool,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            workers: 10,
            memoize: false,
        }
    }
}

/// A link paired with its probe result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedLink {
    /// Index of the link in document order
    pub position: usize,
    pub link: Link,
    pub outcome: ProbeOutcome,
}

// One probe, and every (position, link) occurrence that will receive its
// outcome
struct Job {
    target: String,
    links: Vec<(usize, Link)>,
}

// Checks all links of a document concurrently
//
// Results come back in completion order, not document order: a slow server
// never holds up reporting of the links behind it.
//
// on_progress(done, total) is called after each completion, where both
// numbers count link occurrences.
pub async fn check_links<F>(
    prober: &Prober,
    links: Vec<Link>,
    options: ScheduleOptions,
    mut on_progress: F,
) -> Vec<CheckedLink>
where
    F: FnMut(usize, usize),
{
    let total = links.len();
    let jobs = into_jobs(links, options.memoize);

    let probes = jobs.into_iter().map(|job| async move {
        // Non-HTTP targets never reach the prober
        let outcome = if is_http_url(&job.target) {
            prober.probe(&job.target).await
        } else {
            ProbeOutcome::skipped(job.target.as_str())
        };
        (job.links, outcome)
    });

    let mut completed = stream::iter(probes).buffer_unordered(options.workers.max(1));

    let mut results = Vec::with_capacity(total);
    while let Some((links, outcome)) = completed.next().await {
        for (position, link) in links {
            results.push(CheckedLink {
                position,
                link,
                outcome: outcome.clone(),
            });
        }
        on_progress(results.len(), total);
    }

    results
}

// Without memoization every occurrence is its own job. With it, occurrences
// are grouped by target, in order of first appearance.
fn into_jobs(links: Vec<Link>, memoize: bool) -> Vec<Job> {
    let numbered = links.into_iter().enumerate();
    if !memoize {
        return numbered
            .map(|(position, link)| Job {
                target: link.target.clone(),
                links: vec![(position, link)],
            })
            .collect();
    }

    let mut jobs: Vec<Job> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (position, link) in numbered {
        match index.get(&link.target) {
            Some(&i) => jobs[i].links.push((position, link)),
            None => {
                index.insert(link.target.clone(), jobs.len());
                jobs.push(Job {
                    target: link.target.clone(),
                    links: vec![(position, link)],
                });
            }
        }
    }
    jobs
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. What does buffer_unordered(N) do?
//    - Polls up to N futures at once
//    - As soon as one finishes, the next one from the iterator is started
//    - Yields results in the order they finish
//
// 2. Why not tokio::spawn each probe?
//    - All probes share one reqwest Client and the work is pure I/O
//    - Polling them from one task keeps the result list single-writer
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::LinkStatus;
    use std::collections::BTreeSet;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn link(target: impl Into<String>) -> Link {
        let target = target.into();
        Link {
            display_text: target.clone(),
            target,
        }
    }

    fn prober() -> Prober {
        Prober::new(Duration::from_secs(5)).unwrap()
    }

    async fn mixed_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(path("/ok"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .mount(&server)
            .await;
        Mock::given(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        server
    }

    fn mixed_links(server: &MockServer) -> Vec<Link> {
        vec![
            link(format!("{}/slow", server.uri())),
            link(format!("{}/ok", server.uri())),
            link(format!("{}/missing", server.uri())),
            link("ftp://files.example.org/archive"),
            link("/relative/without/base"),
        ]
    }

    fn outcome_set(results: &[CheckedLink]) -> BTreeSet<(usize, String, String)> {
        results
            .iter()
            .map(|c| (c.position, c.link.target.clone(), format!("{:?}", c.outcome.status)))
            .collect()
    }

    #[tokio::test]
    async fn test_every_link_gets_exactly_one_outcome() {
        let server = mixed_server().await;
        let links = mixed_links(&server);

        let results = check_links(&prober(), links.clone(), ScheduleOptions::default(), |_, _| {})
            .await;

        assert_eq!(results.len(), links.len());
        for checked in &results {
            assert_eq!(checked.link, links[checked.position]);
            assert_eq!(checked.link.target, checked.outcome.url);
        }

        let skipped = results
            .iter()
            .filter(|c| c.outcome.status == LinkStatus::Skipped)
            .count();
        let broken = results
            .iter()
            .filter(|c| c.outcome.status == LinkStatus::Broken)
            .count();
        assert_eq!(skipped, 2);
        assert_eq!(broken, 1);
    }

    #[tokio::test]
    async fn test_results_arrive_in_completion_order() {
        let server = mixed_server().await;
        let links = vec![
            link(format!("{}/slow", server.uri())),
            link(format!("{}/ok", server.uri())),
        ];

        let results = check_links(&prober(), links, ScheduleOptions::default(), |_, _| {}).await;

        assert!(results[0].link.target.ends_with("/ok"));
        assert_eq!(results[0].position, 1);
        assert!(results[1].link.target.ends_with("/slow"));
        assert_eq!(results[1].position, 0);
    }

    #[tokio::test]
    async fn test_worker_count_does_not_change_outcomes() {
        let server = mixed_server().await;

        let single = ScheduleOptions {
            workers: 1,
            memoize: false,
        };
        let many = ScheduleOptions {
            workers: 8,
            memoize: false,
        };

        let one = check_links(&prober(), mixed_links(&server), single, |_, _| {}).await;
        let eight = check_links(&prober(), mixed_links(&server), many, |_, _| {}).await;

        assert_eq!(outcome_set(&one), outcome_set(&eight));
    }

    #[tokio::test]
    async fn test_progress_counts_up_to_total() {
        let server = mixed_server().await;
        let links = mixed_links(&server);
        let total = links.len();

        let mut seen = Vec::new();
        check_links(&prober(), links, ScheduleOptions::default(), |done, all| {
            seen.push((done, all));
        })
        .await;

        assert_eq!(seen.len(), total);
        assert!(seen.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(seen.last(), Some(&(total, total)));
    }

    #[tokio::test]
    async fn test_duplicates_are_probed_per_occurrence_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/twice"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let url = format!("{}/twice", server.uri());
        let results = check_links(
            &prober(),
            vec![link(url.clone()), link(url)],
            ScheduleOptions::default(),
            |_, _| {},
        )
        .await;

        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_memoize_probes_each_url_once() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/once"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/once", server.uri());
        let options = ScheduleOptions {
            workers: 4,
            memoize: true,
        };
        let mut progress = Vec::new();
        let results = check_links(
            &prober(),
            vec![link(url.clone()), link(url.clone()), link(url)],
            options,
            |done, total| progress.push((done, total)),
        )
        .await;

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|c| c.outcome.status == LinkStatus::Valid));
        let mut positions: Vec<_> = results.iter().map(|c| c.position).collect();
        positions.sort_unstable();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(progress, vec![(3, 3)]);
    }

    #[test]
    fn test_into_jobs_groups_by_first_appearance() {
        let links = vec![link("https://b"), link("https://a"), link("https://b")];
        let jobs = into_jobs(links, true);
        let targets: Vec<_> = jobs.iter().map(|j| j.target.as_str()).collect();
        assert_eq!(targets, vec!["https://b", "https://a"]);
        let positions: Vec<_> = jobs[0].links.iter().map(|(p, _)| *p).collect();
        assert_eq!(positions, vec![0, 2]);
    }
}
