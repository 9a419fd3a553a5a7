//! Mock AppVeyor API for E2E tests.
//!
//! Starts an in-process HTTP server serving the project, history, build
//! details and job test endpoints from in-memory state, using AppVeyor's
//! JSON shapes.

use std::collections::HashSet;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, get, web};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;

pub const API_KEY: &str = "test-api-key";
pub const ACCOUNT: &str = "appsvc";
pub const PROJECT: &str = "azure-functions-host";
pub const SLUG: &str = "azure-functions-host-y8o14";

/// Fixed "now" of the test calendar.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 8, 12, 0, 0).unwrap()
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    now() - Duration::days(days)
}

/// A job and the (name, outcome) pairs it reports.
#[derive(Clone)]
pub struct MockJob {
    pub id: String,
    pub tests: Vec<(String, String)>,
}

#[derive(Clone)]
pub struct MockBuild {
    pub id: u64,
    pub version: String,
    pub branch: String,
    pub status: String,
    pub pull_request_id: Option<String>,
    pub finished: DateTime<Utc>,
    pub jobs: Vec<MockJob>,
}

impl MockBuild {
    pub fn new(id: u64, status: &str, finished: DateTime<Utc>) -> Self {
        MockBuild {
            id,
            version: format!("1.0.{}-abc", id),
            branch: "dev".to_string(),
            status: status.to_string(),
            pull_request_id: None,
            finished,
            jobs: Vec::new(),
        }
    }

    pub fn with_job(mut self, id: &str, tests: &[(&str, &str)]) -> Self {
        self.jobs.push(MockJob {
            id: id.to_string(),
            tests: tests
                .iter()
                .map(|(n, o)| (n.to_string(), o.to_string()))
                .collect(),
        });
        self
    }

    pub fn on_branch(mut self, branch: &str) -> Self {
        self.branch = branch.to_string();
        self
    }

    pub fn pull_request(mut self, id: &str) -> Self {
        self.pull_request_id = Some(id.to_string());
        self
    }

    fn to_json(&self, with_jobs: bool) -> serde_json::Value {
        let jobs: Vec<serde_json::Value> = if with_jobs {
            self.jobs
                .iter()
                .map(|j| {
                    json!({
                        "jobId": j.id,
                        "name": "Environment: default",
                        "status": self.status,
                        "testsCount": j.tests.len(),
                        "failedTestsCount": j.tests.iter().filter(|(_, o)| o == "Failed").count(),
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        let mut build = json!({
            "buildId": self.id,
            "jobs": jobs,
            "buildNumber": self.id,
            "version": self.version,
            "message": "Merge pull request",
            "branch": self.branch,
            "isTag": false,
            "commitId": "0123456789abcdef",
            "authorName": "ci-bot",
            "status": self.status,
            "started": (self.finished - Duration::minutes(20)).to_rfc3339(),
            "finished": self.finished.to_rfc3339(),
            "created": (self.finished - Duration::minutes(21)).to_rfc3339(),
        });
        if let Some(ref pr) = self.pull_request_id {
            build["pullRequestId"] = json!(pr);
        }
        build
    }
}

/// Shared state for the mock API.
#[derive(Default)]
pub struct MockState {
    /// Any order; served newest first
    pub builds: Vec<MockBuild>,
    /// Job IDs whose test endpoint answers 500
    pub failing_jobs: HashSet<String>,
    /// Job IDs whose test endpoint answers with a broken body
    pub garbled_jobs: HashSet<String>,
    /// `startBuildId` of every history request, in order
    pub history_requests: Vec<Option<u64>>,
}

type SharedState = web::Data<Arc<Mutex<MockState>>>;

fn authorized(req: &HttpRequest) -> bool {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", API_KEY))
}

fn project_json() -> serde_json::Value {
    json!({
        "projectId": 321,
        "accountId": 123,
        "accountName": ACCOUNT,
        "builds": [],
        "name": PROJECT,
        "slug": SLUG,
        "repositoryType": "gitHub",
        "repositoryScm": "git",
        "repositoryName": "Azure/azure-functions-host",
        "repositoryBranch": "dev",
    })
}

#[get("/api/projects")]
async fn projects(req: HttpRequest) -> HttpResponse {
    if !authorized(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    HttpResponse::Ok().json(json!([
        {
            "projectId": 1,
            "accountId": 123,
            "accountName": ACCOUNT,
            "name": "azure-webjobs-sdk",
            "slug": "azure-webjobs-sdk-rqm4t",
        },
        project_json(),
    ]))
}

#[derive(Deserialize)]
struct HistoryQuery {
    #[serde(rename = "recordsNumber")]
    records_number: usize,
    branch: Option<String>,
    #[serde(rename = "startBuildId")]
    start_build_id: Option<u64>,
}

#[get("/api/projects/{account}/{slug}/history")]
async fn history(
    req: HttpRequest,
    path: web::Path<(String, String)>,
    query: web::Query<HistoryQuery>,
    state: SharedState,
) -> HttpResponse {
    if !authorized(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    let (account, slug) = path.into_inner();
    if account != ACCOUNT || slug != SLUG {
        return HttpResponse::NotFound().finish();
    }

    let mut state = state.lock().unwrap();
    state.history_requests.push(query.start_build_id);

    let mut builds: Vec<&MockBuild> = state
        .builds
        .iter()
        .filter(|b| query.branch.as_deref().is_none_or(|br| b.branch == br))
        .filter(|b| query.start_build_id.is_none_or(|start| b.id < start))
        .collect();
    builds.sort_by(|a, b| b.id.cmp(&a.id));
    let page: Vec<serde_json::Value> = builds
        .into_iter()
        .take(query.records_number)
        .map(|b| b.to_json(false))
        .collect();

    HttpResponse::Ok().json(json!({ "project": project_json(), "builds": page }))
}

#[get("/api/projects/{account}/{slug}/build/{version}")]
async fn build_details(
    req: HttpRequest,
    path: web::Path<(String, String, String)>,
    state: SharedState,
) -> HttpResponse {
    if !authorized(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    let (_, _, version) = path.into_inner();
    let state = state.lock().unwrap();
    match state.builds.iter().find(|b| b.version == version) {
        Some(build) => HttpResponse::Ok().json(json!({
            "project": project_json(),
            "build": build.to_json(true),
        })),
        None => HttpResponse::NotFound().finish(),
    }
}

#[get("/api/buildjobs/{job_id}/tests")]
async fn job_tests(req: HttpRequest, path: web::Path<String>, state: SharedState) -> HttpResponse {
    if !authorized(&req) {
        return HttpResponse::Unauthorized().finish();
    }
    let job_id = path.into_inner();
    let state = state.lock().unwrap();

    if state.failing_jobs.contains(&job_id) {
        return HttpResponse::InternalServerError().finish();
    }
    if state.garbled_jobs.contains(&job_id) {
        return HttpResponse::Ok()
            .content_type("application/json")
            .body("{\"list\": [");
    }

    let Some(job) = state
        .builds
        .iter()
        .flat_map(|b| b.jobs.iter())
        .find(|j| j.id == job_id)
    else {
        return HttpResponse::NotFound().finish();
    };

    let list: Vec<serde_json::Value> = job
        .tests
        .iter()
        .map(|(name, outcome)| {
            json!({
                "fileName": "WebJobs.Script.Tests.dll",
                "name": name,
                "outcome": outcome,
                "duration": 15,
                "created": now().to_rfc3339(),
                "stdOut": "",
                "stdErr": "",
            })
        })
        .collect();
    let passed = job.tests.iter().filter(|(_, o)| o == "Passed").count();
    let failed = job.tests.iter().filter(|(_, o)| o == "Failed").count();

    HttpResponse::Ok().json(json!({
        "failed": failed,
        "passed": passed,
        "total": list.len(),
        "list": list,
    }))
}

/// Mock AppVeyor API server.
pub struct MockAppVeyor {
    pub endpoint: String,
    pub web_url: String,
    pub state: Arc<Mutex<MockState>>,
}

impl MockAppVeyor {
    /// Start the mock API on an ephemeral port.
    pub async fn start(builds: Vec<MockBuild>) -> Self {
        let state = Arc::new(Mutex::new(MockState {
            builds,
            ..MockState::default()
        }));

        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
        let port = listener.local_addr().unwrap().port();
        let base = format!("http://127.0.0.1:{}", port);

        let state_data = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(state_data.clone()))
                .service(projects)
                .service(history)
                .service(build_details)
                .service(job_tests)
        })
        .workers(1)
        .listen(listener)
        .expect("failed to listen")
        .disable_signals()
        .run();

        // Fire and forget - server lives for the process lifetime
        tokio::spawn(server);

        MockAppVeyor {
            endpoint: format!("{}/api", base),
            web_url: base,
            state,
        }
    }

    pub fn fail_job(&self, job_id: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_jobs
            .insert(job_id.to_string());
    }

    pub fn garble_job(&self, job_id: &str) {
        self.state
            .lock()
            .unwrap()
            .garbled_jobs
            .insert(job_id.to_string());
    }

    pub fn history_requests(&self) -> Vec<Option<u64>> {
        self.state.lock().unwrap().history_requests.clone()
    }
}
