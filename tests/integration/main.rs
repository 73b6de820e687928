//! Integration tests for cachepost

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::path::Path;
    use std::thread::{self, JoinHandle};
    use tempfile::TempDir;

    /// Serve exactly one canned HTTP response and return the request line
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                if header == "\r\n" || header.is_empty() {
                    break;
                }
            }

            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            )
            .unwrap();
            stream.flush().unwrap();
            request_line
        });

        (url, handle)
    }

    fn write_config(dir: &Path, api_url: &str) -> std::path::PathBuf {
        let path = dir.join("config.toml");
        std::fs::write(&path, format!("[github]\napi_url = \"{}\"\n", api_url)).unwrap();
        path
    }

    fn cachepost(config: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("cachepost");
        cmd.env_clear()
            .arg("--config")
            .arg(config)
            .env("GITHUB_JOB", "build")
            .env("GITHUB_RUN_ID", "4242")
            .env("GITHUB_REPOSITORY", "octo/widgets")
            .env("INPUT_GITHUBTOKEN", "ghs_test")
            .env("STATE_computedCacheKey", r#"{"primary":"abc123"}"#)
            .env("STATE_cacheRoot", "/cache");
        cmd
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("cachepost")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("cache decision step"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("cachepost")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("cachepost"));
    }

    #[test]
    fn missing_run_id_fails_with_config_error() {
        let dir = TempDir::new().unwrap();
        // Nothing listens here; a request would fail differently
        let config = write_config(dir.path(), "http://127.0.0.1:9");

        cachepost(&config)
            .env_remove("GITHUB_RUN_ID")
            .arg("--dry-run")
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Value for 'GITHUB_RUN_ID' is not defined"))
            .stderr(predicate::str::contains("Failed to query").not());
    }

    #[test]
    fn failure_is_annotated_inside_actions() {
        let dir = TempDir::new().unwrap();
        let config = write_config(dir.path(), "http://127.0.0.1:9");

        cachepost(&config)
            .env("GITHUB_ACTIONS", "true")
            .env("GITHUB_REPOSITORY", "widgets")
            .arg("--dry-run")
            .assert()
            .code(3)
            .stdout(predicate::str::contains("::error::cachepost post-job step failed"));
    }

    #[test]
    fn successful_run_saves_cache() {
        let dir = TempDir::new().unwrap();
        let (url, server) = serve_once("200 OK", r#"{"id":4242,"name":"CI","status":"success"}"#);
        let config = write_config(dir.path(), &url);

        cachepost(&config)
            .env("INPUT_DONOTCACHEONWORKFLOWFAILURE", "true")
            .arg("--dry-run")
            .assert()
            .success()
            .stdout(predicate::str::contains("Saving cache"))
            .stdout(predicate::str::contains("Dry run: would save"));

        let request_line = server.join().unwrap();
        assert!(request_line.starts_with("GET /repos/octo/widgets/actions/runs/4242 "));
    }

    #[test]
    fn not_found_run_warns_and_skips() {
        let dir = TempDir::new().unwrap();
        let (url, server) = serve_once("404 Not Found", r#"{"message":"Not Found"}"#);
        let config = write_config(dir.path(), &url);
        let log = dir.path().join("decisions.jsonl");

        cachepost(&config)
            .env("INPUT_DONOTCACHEONWORKFLOWFAILURE", "true")
            .arg("--dry-run")
            .arg("--decision-log")
            .arg(&log)
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Failed to fetch jobs for workflow run 4242 (HTTP code 404)",
            ))
            .stdout(predicate::str::contains("Skipping cache save"));

        server.join().unwrap();
        let content = std::fs::read_to_string(&log).unwrap();
        assert!(content.contains("\"decision\":\"skip_job_failed\""));
    }

    #[test]
    fn not_found_run_is_annotated_inside_actions() {
        let dir = TempDir::new().unwrap();
        let (url, server) = serve_once("404 Not Found", r#"{"message":"Not Found"}"#);
        let config = write_config(dir.path(), &url);

        cachepost(&config)
            .env("GITHUB_ACTIONS", "true")
            .arg("--dry-run")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "::warning::Failed to fetch jobs for workflow run 4242 (HTTP code 404)",
            ));

        server.join().unwrap();
    }

    #[test]
    fn not_found_run_is_not_annotated_outside_actions() {
        let dir = TempDir::new().unwrap();
        let (url, server) = serve_once("404 Not Found", r#"{"message":"Not Found"}"#);
        let config = write_config(dir.path(), &url);

        cachepost(&config)
            .arg("--dry-run")
            .assert()
            .success()
            .stdout(predicate::str::contains("::warning::").not());

        server.join().unwrap();
    }

    #[test]
    fn dry_run_reports_cache_hit_skip() {
        let dir = TempDir::new().unwrap();
        let (url, server) = serve_once("200 OK", r#"{"status":"success"}"#);
        let config = write_config(dir.path(), &url);

        cachepost(&config)
            .env("STATE_cacheHit", "true")
            .arg("--dry-run")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "Dry run: cache hit on primary key abc123, would not save",
            ))
            .stdout(predicate::str::contains("Dry run: would save").not());

        server.join().unwrap();
    }

    #[test]
    fn save_command_failure_exits_with_failure_code() {
        let dir = TempDir::new().unwrap();
        let (url, server) = serve_once("200 OK", r#"{"status":"success"}"#);
        let config = dir.path().join("config.toml");
        std::fs::write(
            &config,
            format!(
                "[github]\napi_url = \"{}\"\n\n[cache]\nsave_command = [\"cachepost-no-such-program\"]\n",
                url
            ),
        )
        .unwrap();

        cachepost(&config)
            .assert()
            .code(3)
            .stderr(predicate::str::contains("cachepost-no-such-program"));

        server.join().unwrap();
    }
}
