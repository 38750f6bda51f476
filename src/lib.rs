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

//! Generates a header of typed C++ wrappers around the OpenXR C API from the
//! registry (`xr.xml`).
//!
//! Example:
//! ```rust
//! use std::{fs, io};
//!
//! fn main() {
//! 	xrhpp::generate(
//! 		fs::File::open("xr.xml")
//! 			.map(io::BufReader::new)
//! 			.expect("failed to open input file"),
//! 		fs::File::create("openxr.hpp")
//! 			.map(io::BufWriter::new)
//! 			.expect("failed to open output file"),
//! 		&xrhpp::Config::default()
//! 	).unwrap();
//! }
//! ```

use {std::io::{self, BufRead, Write}, tracing::info};

pub use {parse::*, gen::{gen, Config}};

pub mod xml;
pub mod parse;
pub mod gen;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("failed to read the registry: {0}")]
	Xml(#[from] xml::Error),
	#[error("failed to write the header: {0}")]
	Io(#[from] io::Error),
	#[error("struct `{name}` contains itself by value")]
	DependencyCycle { name: String },
	#[error("the registry has typed structs but no `XrStructureType` enum")]
	MissingStructureType
}

/// Reads a registry and writes the generated header.
pub fn generate(
	reader:     impl BufRead,
	mut writer: impl Write,
	config:     &Config
) -> Result<(), Error> {
	let registry: Registry = xml::deserialize(reader)?;
	info!(
		structs = registry.structs.len(),
		enums = registry.enums.len(),
		aliases = registry.aliases.len(),
		"parsed registry"
	);
	
	gen(&mut writer, &registry, config)?;
	writer.flush()?;
	Ok(())
}

#[cfg(test)]
pub(crate) mod test_data {
	use crate::{xml, parse::Registry};
	
	pub const MINI_XR: &str = include_str!("../tests/data/mini_xr.xml");
	
	pub fn registry() -> Registry {
		xml::deserialize(MINI_XR.as_bytes()).expect("failed to parse the test registry")
	}
	
	/// Platform extensions: one guarded by `protect`, one only naming a `platform`.
	pub fn platform_registry() -> Registry {
		xml::deserialize(include_str!("../tests/data/platform_xr.xml").as_bytes())
			.expect("failed to parse the platform registry")
	}
}
