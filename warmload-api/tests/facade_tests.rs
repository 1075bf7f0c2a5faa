//! 集成测试 - Warmload 控制接口

mod common;

use std::io::Write;
use std::path::{Path, PathBuf};

use common::setup;
use warmload_api::warmload_log::Level;
use warmload_api::{ExclusionPattern, PolicyConfig};

#[test]
fn test_enable_disable_are_idempotent() {
    let mut s = setup(PolicyConfig::new());

    assert!(!s.warmload.is_active());
    assert!(s.warmload.enable().is_some());
    assert!(s.warmload.enable().is_none());
    assert!(s.warmload.is_active());

    assert!(s.warmload.disable());
    assert!(!s.warmload.disable());
    assert!(s.host.pipeline.is_empty());
}

#[test]
fn test_enable_reports_sweep() {
    let mut s = setup(PolicyConfig::reference(None));
    s.host.load("/home/u/lib/a.el");
    s.host.load("/usr/share/emacs/b.el");

    let report = s.warmload.enable().unwrap();

    assert_eq!(report.visited, 2);
    assert_eq!(report.compiled, 1);
    assert_eq!(
        s.ring.count_matching(Level::Info, "Compiled 1 of 2 previously loaded files"),
        1
    );
}

#[test]
fn test_load_cycle_through_facade() {
    let mut s = setup(PolicyConfig::new());
    s.warmload.enable();

    let report = s.host.load("/home/u/lib/widget.el");
    assert!(report.was_handled());

    let run = s.host.idle();
    assert_eq!(run.loaded, vec![PathBuf::from("/home/u/lib/widget.eln")]);
    assert_eq!(s.warmload.stats().compiled, 1);
}

#[test]
fn test_compile_failure_only_notifies() {
    let mut s = setup(PolicyConfig::new());
    s.warmload.enable();

    let report = s.host.load("/home/u/lib/broken.el");

    assert!(!report.was_handled());
    assert_eq!(s.warmload.stats().failed, 1);
    assert_eq!(s.ring.count_matching(Level::Warn, "broken.el"), 1);
    assert!(s.host.queue.is_empty());
}

#[test]
fn test_invalid_pattern_warned_on_enable() {
    let mut s = setup(PolicyConfig::new().with_exclusion(ExclusionPattern::regex("(oops")));

    s.warmload.enable();

    assert_eq!(s.ring.count_matching(Level::Warn, "(oops"), 1);
    assert!(s.warmload.is_eligible(Path::new("/home/u/oops.el")));
}

#[test]
fn test_reload_policy() {
    let s = setup(PolicyConfig::new());
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"system_dirs": ["/srv/site-lisp"]}}"#).unwrap();

    assert!(s.warmload.is_eligible(Path::new("/srv/site-lisp/x.el")));
    s.warmload.reload_policy(file.path()).unwrap();
    assert!(!s.warmload.is_eligible(Path::new("/srv/site-lisp/x.el")));
}

#[test]
fn test_reload_policy_error_keeps_policy() {
    let s = setup(PolicyConfig::new().with_exclusion(ExclusionPattern::prefix("/srv")));
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();

    let err = s.warmload.reload_policy(file.path()).unwrap_err();

    assert_eq!(err.phase(), "config");
    assert!(!s.warmload.is_eligible(Path::new("/srv/x.el")));
}

#[test]
fn test_policy_handle_updates_live() {
    let mut s = setup(PolicyConfig::new());
    s.warmload.enable();

    s.warmload
        .policy()
        .push_exclusion(ExclusionPattern::regex("scratch"));

    assert!(!s.host.load("/home/u/scratch.el").was_handled());
    assert!(s.compiler.compiled.lock().unwrap().is_empty());
}
