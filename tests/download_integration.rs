//! Integration tests for subject downloads.
//!
//! These tests run the full fetch → filter → download → rename flow against
//! mock HTTP servers.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use exam_reports::config::{LibraryLayout, SiteConfig};
use exam_reports::download::{DOWNLOAD_WORKERS, DownloadError, DownloadOrchestrator};
use exam_reports::events::DownloadEvent;
use exam_reports::remote::HttpClient;
use tempfile::TempDir;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const SUBJECT_PAGE: &str = "/subjects/chemistry";

async fn mount_page(server: &MockServer, page_path: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

async fn mount_file(server: &MockServer, file_path: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(file_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// Serves a small body after `delay` and records when each request arrived.
struct DelayedFile {
    delay: Duration,
    arrivals: Arc<Mutex<Vec<Instant>>>,
}

impl Respond for DelayedFile {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        ResponseTemplate::new(200)
            .set_body_bytes(b"report".to_vec())
            .set_delay(self.delay)
    }
}

fn orchestrator(server: &MockServer, root: &Path) -> DownloadOrchestrator {
    let site = SiteConfig::from_index_url(&format!("{}/index", server.uri()))
        .expect("mock server URI is absolute");
    DownloadOrchestrator::new(HttpClient::new(), LibraryLayout::new(root), site)
}

fn drain(mut rx: UnboundedReceiver<DownloadEvent>) -> Vec<DownloadEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn file_names(dir: &Path) -> BTreeSet<String> {
    std::fs::read_dir(dir)
        .expect("folder should exist")
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect()
}

#[tokio::test]
async fn test_download_subject_filters_links_and_names_files() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");

    mount_page(
        &server,
        SUBJECT_PAGE,
        r#"<html><body>
            <a href="/files/chem-2023-report-1.pdf">2023 Chemistry Exam Report</a>
            <a href="/files/chem-2022-report.docx">2022 examination report</a>
            <a href="/files/chem-2023-sample.pdf">Sample report</a>
            <a href="/files/formula.pdf">Formula Sheet</a>
            <a href="/files/chem-2021-report.html">2021 report</a>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_file(&server, "/files/chem-2023-report-1.pdf", b"pdf 2023").await;
    mount_file(&server, "/files/chem-2022-report.docx", b"docx 2022").await;

    let (tx, rx) = unbounded_channel();
    let summary = orchestrator(&server, temp.path())
        .download_subject(
            "Chemistry",
            &format!("{}{SUBJECT_PAGE}", server.uri()),
            &tx,
        )
        .await
        .expect("batch should succeed");

    assert_eq!(summary.total, 2);
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.failed, 0);

    let folder = temp.path().join("Chemistry");
    assert_eq!(
        file_names(&folder),
        BTreeSet::from([
            "Chemistry_2022.docx".to_string(),
            "Chemistry_2023_exam1.pdf".to_string(),
        ])
    );
    assert_eq!(
        std::fs::read(folder.join("Chemistry_2023_exam1.pdf")).unwrap(),
        b"pdf 2023"
    );

    let events = drain(rx);
    assert!(matches!(
        events.first(),
        Some(DownloadEvent::Progress { message, completed: 0, total: 2 })
            if message == "Starting concurrent downloads..."
    ));
    match events.last() {
        Some(DownloadEvent::Finished { message, .. }) => {
            assert_eq!(message, "All reports for Chemistry downloaded.");
        }
        other => panic!("expected Finished, got {other:?}"),
    }
    let saved = events
        .iter()
        .filter(|e| matches!(e, DownloadEvent::FileSaved { .. }))
        .count();
    assert_eq!(saved, 2);
}

#[tokio::test]
async fn test_download_subject_never_overwrites_existing_names() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");
    let folder = temp.path().join("Chemistry");
    std::fs::create_dir_all(&folder).unwrap();
    std::fs::write(folder.join("Chemistry_2021.pdf"), b"already here").unwrap();

    mount_page(
        &server,
        SUBJECT_PAGE,
        r#"<a href="/a/chem-2021-report.pdf">2021 report</a>
           <a href="/b/chem-2021-report.pdf">2021 report (reissued)</a>"#
            .to_string(),
    )
    .await;
    mount_file(&server, "/a/chem-2021-report.pdf", b"first").await;
    mount_file(&server, "/b/chem-2021-report.pdf", b"second").await;

    let (tx, _rx) = unbounded_channel();
    let summary = orchestrator(&server, temp.path())
        .download_subject(
            "Chemistry",
            &format!("{}{SUBJECT_PAGE}", server.uri()),
            &tx,
        )
        .await
        .unwrap();
    assert_eq!(summary.completed, 2);

    assert_eq!(
        std::fs::read(folder.join("Chemistry_2021.pdf")).unwrap(),
        b"already here"
    );
    let second = std::fs::read(folder.join("Chemistry_2021_2.pdf")).unwrap();
    let third = std::fs::read(folder.join("Chemistry_2021_3.pdf")).unwrap();
    let mut bodies = vec![second, third];
    bodies.sort();
    assert_eq!(bodies, vec![b"first".to_vec(), b"second".to_vec()]);
}

#[tokio::test]
async fn test_download_subject_failure_does_not_abort_batch() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");

    mount_page(
        &server,
        SUBJECT_PAGE,
        r#"<a href="/files/chem-2020-report.pdf">2020 report</a>
           <a href="/files/chem-2019-report.pdf">2019 report</a>
           <a href="/files/chem-2018-report.pdf">2018 report</a>"#
            .to_string(),
    )
    .await;
    mount_file(&server, "/files/chem-2020-report.pdf", b"2020").await;
    mount_file(&server, "/files/chem-2018-report.pdf", b"2018").await;
    Mock::given(method("GET"))
        .and(path("/files/chem-2019-report.pdf"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (tx, rx) = unbounded_channel();
    let summary = orchestrator(&server, temp.path())
        .download_subject(
            "Chemistry",
            &format!("{}{SUBJECT_PAGE}", server.uri()),
            &tx,
        )
        .await
        .unwrap();

    assert_eq!(summary.total, 3);
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.saved.len(), 2);

    let folder = temp.path().join("Chemistry");
    assert_eq!(
        file_names(&folder),
        BTreeSet::from([
            "Chemistry_2018.pdf".to_string(),
            "Chemistry_2020.pdf".to_string(),
        ]),
        "failed download must not leave temp files behind"
    );

    let events = drain(rx);
    let failures: Vec<&DownloadEvent> = events
        .iter()
        .filter(|e| matches!(e, DownloadEvent::FileFailed { .. }))
        .collect();
    assert_eq!(failures.len(), 1);
    match failures[0] {
        DownloadEvent::FileFailed { url, reason } => {
            assert!(url.ends_with("/files/chem-2019-report.pdf"));
            assert!(reason.contains("404"), "reason: {reason}");
        }
        _ => unreachable!(),
    }
    match events.last() {
        Some(DownloadEvent::Finished {
            completed,
            failed,
            total,
            ..
        }) => {
            assert_eq!((*completed, *failed, *total), (2, 1, 3));
        }
        other => panic!("expected Finished, got {other:?}"),
    }
}

#[tokio::test]
async fn test_download_subject_progress_counts_in_order() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");

    let mut html = String::new();
    for year in 2010..2017 {
        let file = format!("/files/chem-{year}-report.pdf");
        html.push_str(&format!(r#"<a href="{file}">{year} report</a>"#));
        mount_file(&server, &file, year.to_string().as_bytes()).await;
    }
    mount_page(&server, SUBJECT_PAGE, html).await;

    let (tx, rx) = unbounded_channel();
    let summary = orchestrator(&server, temp.path())
        .download_subject(
            "Chemistry",
            &format!("{}{SUBJECT_PAGE}", server.uri()),
            &tx,
        )
        .await
        .unwrap();
    assert_eq!(summary.completed, 7);

    let counts: Vec<usize> = drain(rx)
        .into_iter()
        .filter_map(|e| match e {
            DownloadEvent::Progress {
                completed, total, ..
            } => {
                assert_eq!(total, 7);
                Some(completed)
            }
            _ => None,
        })
        .collect();
    assert_eq!(counts, (0..=7).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_download_subject_without_reports_is_informational() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");
    mount_page(
        &server,
        SUBJECT_PAGE,
        r#"<a href="/files/chem-data-book.pdf">Data book</a>"#.to_string(),
    )
    .await;

    let (tx, rx) = unbounded_channel();
    let summary = orchestrator(&server, temp.path())
        .download_subject(
            "Chemistry",
            &format!("{}{SUBJECT_PAGE}", server.uri()),
            &tx,
        )
        .await
        .unwrap();

    assert!(summary.is_empty());
    assert!(!temp.path().join("Chemistry").exists());
    match drain(rx).as_slice() {
        [DownloadEvent::Finished { message, total: 0, .. }] => {
            assert_eq!(message, "No examination reports found for Chemistry.");
        }
        other => panic!("unexpected events {other:?}"),
    }
}

#[tokio::test]
async fn test_download_subject_page_error_is_reported() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");
    Mock::given(method("GET"))
        .and(path(SUBJECT_PAGE))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (tx, _rx) = unbounded_channel();
    let result = orchestrator(&server, temp.path())
        .download_subject(
            "Chemistry",
            &format!("{}{SUBJECT_PAGE}", server.uri()),
            &tx,
        )
        .await;
    assert!(matches!(result, Err(DownloadError::Fetch(_))));
}

#[tokio::test]
async fn test_download_subject_cleans_folder_name() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");
    mount_page(
        &server,
        SUBJECT_PAGE,
        r#"<a href="/files/drama-2022-report.pdf">2022 report</a>"#.to_string(),
    )
    .await;
    mount_file(&server, "/files/drama-2022-report.pdf", b"drama").await;

    let (tx, _rx) = unbounded_channel();
    let summary = orchestrator(&server, temp.path())
        .download_subject(
            "Drama: Theatre Studies",
            &format!("{}{SUBJECT_PAGE}", server.uri()),
            &tx,
        )
        .await
        .unwrap();

    assert_eq!(summary.folder, temp.path().join("Drama__Theatre_Studies"));
    assert!(
        temp.path()
            .join("Drama__Theatre_Studies/Drama__Theatre_Studies_2022.pdf")
            .is_file()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_download_subject_runs_at_most_five_transfers_at_once() {
    let server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");
    let delay = Duration::from_millis(250);
    let arrivals = Arc::new(Mutex::new(Vec::new()));

    let mut html = String::new();
    for year in 2000..2012 {
        html.push_str(&format!(
            r#"<a href="/files/chem-{year}-report.pdf">{year} report</a>"#
        ));
    }
    mount_page(&server, SUBJECT_PAGE, html).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/files/.*\.pdf$"))
        .respond_with(DelayedFile {
            delay,
            arrivals: Arc::clone(&arrivals),
        })
        .mount(&server)
        .await;

    let (tx, _rx) = unbounded_channel();
    let summary = orchestrator(&server, temp.path())
        .download_subject(
            "Chemistry",
            &format!("{}{SUBJECT_PAGE}", server.uri()),
            &tx,
        )
        .await
        .unwrap();
    assert_eq!(summary.completed, 12);

    // A request that arrives while `DOWNLOAD_WORKERS` others are still being
    // served would mean the pool is larger than allowed.
    let mut arrivals = arrivals.lock().unwrap().clone();
    arrivals.sort();
    assert_eq!(arrivals.len(), 12);
    let peak = (0..arrivals.len())
        .map(|i| {
            arrivals[i..]
                .iter()
                .take_while(|at| at.duration_since(arrivals[i]) < delay)
                .count()
        })
        .max()
        .unwrap();
    assert!(peak <= DOWNLOAD_WORKERS, "peak in-flight requests: {peak}");
    assert!(peak > 1, "downloads never overlapped");
}
