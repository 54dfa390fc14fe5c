use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use akane::{Interpreter, RuntimeErrorKind};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A unique scratch directory per test, removed on drop.
struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!(
            "akane_require_test_{}_{}",
            std::process::id(),
            DIR_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::create_dir_all(&path).expect("create scratch dir");
        Self { path }
    }

    fn write(&self, name: &str, contents: &str) {
        fs::write(self.path.join(name), contents).expect("write fixture");
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn new_vm() -> Interpreter {
    Interpreter::new(Path::new("/nonexistent"), "test.ak")
}

#[test]
fn require_evaluates_the_file_and_returns_true() {
    let dir = ScratchDir::new();
    dir.write("greeting.ak", "x = 99\n");
    let mut vm = new_vm();
    vm.push_load_path(&dir.path.to_string_lossy());

    let result = vm.run("require 'greeting'").expect("require");
    assert_eq!(vm.as_bool(result), Some(true));
    // Top-level bindings made by the loaded file are visible afterwards.
    let x = vm.get("x").expect("x bound by the required file");
    assert_eq!(vm.as_fixnum(x), Some(99));
}

#[test]
fn require_missing_file_raises_a_load_error() {
    let mut vm = new_vm();
    let err = vm.run("require 'missing_file'").expect_err("load error");
    assert_eq!(err.kind, RuntimeErrorKind::Load);
    assert!(err.message.contains("missing_file"));
    assert!(err.backtrace.contains("main (test.ak)"));
}

#[test]
fn require_rubygems_is_a_no_op() {
    let mut vm = new_vm();
    let result = vm.run("require 'rubygems'").expect("no-op require");
    assert_eq!(vm.as_bool(result), Some(false));
}

#[test]
fn required_file_runs_under_its_own_filename() {
    let dir = ScratchDir::new();
    dir.write("deep.ak", "loaded_from = __FILE__\n");
    let mut vm = new_vm();
    vm.push_load_path(&dir.path.to_string_lossy());

    vm.run("require 'deep'").expect("require");
    let loaded_from = vm.get("loaded_from").expect("binding from loaded file");
    let recorded = vm.as_str(loaded_from).expect("string").to_string();
    assert!(recorded.ends_with("deep.ak"), "recorded: {}", recorded);

    // The requiring file's name is restored afterwards.
    let result = vm.run("__FILE__").expect("run");
    assert_eq!(vm.as_str(result), Some("test.ak"));
}

#[test]
fn filename_is_restored_when_the_required_file_raises() {
    let dir = ScratchDir::new();
    dir.write("bad.ak", "raise 'broken'\n");
    let mut vm = new_vm();
    vm.push_load_path(&dir.path.to_string_lossy());

    let err = vm.run("require 'bad'").expect_err("required file raised");
    assert_eq!(err.display_name(), "broken");
    let result = vm.run("__FILE__").expect("run");
    assert_eq!(vm.as_str(result), Some("test.ak"));
}

#[test]
fn load_path_is_searched_in_order() {
    let first = ScratchDir::new();
    let second = ScratchDir::new();
    first.write("pick.ak", "chosen = 'first'\n");
    second.write("pick.ak", "chosen = 'second'\n");
    let mut vm = new_vm();
    vm.push_load_path(&first.path.to_string_lossy());
    vm.push_load_path(&second.path.to_string_lossy());

    vm.run("require 'pick'").expect("require");
    let chosen = vm.get("chosen").expect("bound");
    assert_eq!(vm.as_str(chosen), Some("first"));
}

#[test]
fn load_path_is_reachable_from_the_language() {
    let mut vm = new_vm();
    let result = vm.run("$LOAD_PATH.size").expect("run");
    assert_eq!(vm.as_fixnum(result), Some(1));
    // Appending through the language works because `$:` is the same array.
    vm.run("$: << 'somewhere'").expect("run");
    let result = vm.run("$LOAD_PATH.size").expect("run");
    assert_eq!(vm.as_fixnum(result), Some(2));
}
