// MIT License
//
// Copyright (c) 2019-2021 Tobias Pfeiffer
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Drives the `xrhpp` binary against the test registry.

use {
	assert_cmd::Command,
	predicates::prelude::*,
	pretty_assertions::assert_eq,
	std::{fs, path::PathBuf},
	tempfile::TempDir
};

const MINI_XR: &str = include_str!("data/mini_xr.xml");

fn xrhpp() -> Command {
	Command::cargo_bin("xrhpp").unwrap()
}

/// A temporary directory holding a copy of the test registry.
fn workspace() -> (TempDir, PathBuf) {
	let tmp = TempDir::new().unwrap();
	let input = tmp.path().join("xr.xml");
	fs::write(&input, MINI_XR).unwrap();
	(tmp, input)
}

#[test]
fn writes_the_header_to_the_output_file() {
	let (tmp, input) = workspace();
	let out = tmp.path().join("wrappers.hpp");
	
	xrhpp()
		.arg(&input)
		.arg("-o")
		.arg(&out)
		.assert()
		.success();
	
	let header = fs::read_to_string(&out).unwrap();
	assert!(header.contains("struct InstanceCreateInfo : public traits::TypedStructTraits<InstanceCreateInfo> {"));
	assert!(header.contains("class Time {"));
	assert!(header.contains("enum class StructureType : int32_t {"));
	assert!(header.contains("using PosefEXT = Posef;"));
}

#[test]
fn defaults_to_openxr_hpp_next_to_the_input() {
	let (tmp, input) = workspace();
	
	xrhpp().arg(&input).assert().success();
	
	assert!(tmp.path().join("openxr.hpp").exists());
}

#[test]
fn reads_the_registry_from_stdin() {
	let (tmp, input) = workspace();
	let from_file = tmp.path().join("from_file.hpp");
	let from_stdin = tmp.path().join("from_stdin.hpp");
	
	xrhpp().arg(&input).arg("-o").arg(&from_file).assert().success();
	xrhpp().arg("-o").arg(&from_stdin).write_stdin(MINI_XR).assert().success();
	
	assert_eq!(fs::read_to_string(&from_stdin).unwrap(), fs::read_to_string(&from_file).unwrap());
}

#[test]
fn applies_namespace_and_guard() {
	let (tmp, input) = workspace();
	let out = tmp.path().join("custom.hpp");
	
	xrhpp()
		.arg(&input)
		.args(["--namespace", "openxr", "--guard", "CUSTOM_XR_HPP"])
		.arg("--out")
		.arg(&out)
		.assert()
		.success();
	
	let header = fs::read_to_string(&out).unwrap();
	assert!(header.contains("#define OPENXR_HPP_NAMESPACE openxr\n"));
	assert!(header.contains("#ifndef CUSTOM_XR_HPP\n#define CUSTOM_XR_HPP\n"));
}

#[test]
fn fails_on_a_missing_input() {
	let tmp = TempDir::new().unwrap();
	
	xrhpp()
		.arg(tmp.path().join("missing.xml"))
		.assert()
		.failure()
		.code(100)
		.stderr(predicate::str::contains("error"));
}

#[test]
fn fails_on_a_malformed_registry_without_writing() {
	let tmp = TempDir::new().unwrap();
	let input = tmp.path().join("broken.xml");
	fs::write(&input, "<registry><types></registry>").unwrap();
	
	xrhpp()
		.arg(&input)
		.assert()
		.failure()
		.stderr(predicate::str::contains("failed to read the registry"));
	
	assert!(!tmp.path().join("openxr.hpp").exists());
}

#[test]
fn fails_on_a_struct_cycle_without_writing() {
	let tmp = TempDir::new().unwrap();
	let input = tmp.path().join("xr.xml");
	fs::write(&input, r#"<registry>
	<types>
		<type category="struct" name="XrA"><member><type>XrB</type> <name>b</name></member></type>
		<type category="struct" name="XrB"><member><type>XrA</type> <name>a</name></member></type>
	</types>
</registry>"#).unwrap();
	
	xrhpp()
		.arg(&input)
		.assert()
		.failure()
		.code(100)
		.stderr(predicate::str::contains("contains itself by value"));
	
	assert!(!tmp.path().join("openxr.hpp").exists());
}

#[test]
fn logs_passes_when_verbose() {
	let (tmp, input) = workspace();
	
	xrhpp()
		.arg(&input)
		.arg("-v")
		.env_remove("RUST_LOG")
		.assert()
		.success()
		.stderr(predicate::str::contains("expanding template"));
	
	assert!(tmp.path().join("openxr.hpp").exists());
}
