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

//! Expands the registry into the C++ header, one template pass at a time.

mod project;
mod enums;
mod aliases;
mod value;
mod structs;

pub use self::{project::*, enums::EnumTemplate, aliases::AliasTemplate, value::*, structs::StructTemplate};

use {
	crate::{parse::*, Error},
	std::{io, collections::HashMap},
	tracing::debug
};

/// Knobs of the generated header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	/// Fallback value of `OPENXR_HPP_NAMESPACE`.
	pub namespace:     String,
	pub include_guard: String
}

impl Default for Config {
	fn default() -> Self {
		Self {
			namespace:     "xr".to_string(),
			include_guard: "OPENXR_HPP_GENERATED_H_".to_string()
		}
	}
}

/// Everything a template can look at while expanding.
pub struct Context<'a> {
	pub registry:  &'a Registry,
	pub config:    &'a Config,
	pub projector: Projector<'a>
}

impl<'a> Context<'a> {
	pub fn new(registry: &'a Registry, config: &'a Config) -> Self {
		Self { registry, config, projector: Projector::new(registry) }
	}
}

/// A single emission pass over the registry.
pub trait Template: Sync {
	fn name(&self) -> &'static str;
	
	fn expand(&self, ctx: &Context, writer: &mut dyn io::Write) -> Result<(), Error>;
}

/// The passes in header order.
pub static TEMPLATES: &[&dyn Template] = &[
	&EnumTemplate,
	&AliasTemplate,
	&ValueTemplate,
	&StructTemplate
];

pub fn gen(writer: &mut impl io::Write, registry: &Registry, config: &Config) -> Result<(), Error> {
	let ctx = Context::new(registry, config);
	
	write_prelude(writer, config)?;
	for template in TEMPLATES {
		debug!(template = template.name(), "expanding template");
		template.expand(&ctx, writer)?;
	}
	write_epilogue(writer, config)?;
	Ok(())
}

fn write_prelude(writer: &mut impl io::Write, config: &Config) -> io::Result<()> {
	write!(writer, r#"// MACHINE GENERATED FILE, DO NOT EDIT!
// Generated by xrhpp {version} from the OpenXR registry (xr.xml).

#ifndef {guard}
#define {guard}

#include <openxr/openxr.h>
#include <openxr/openxr_platform.h>

#include <cstdint>
#include <cstring>

#ifndef OPENXR_HPP_NAMESPACE
#define OPENXR_HPP_NAMESPACE {namespace}
#endif

#ifndef OPENXR_HPP_INLINE
#define OPENXR_HPP_INLINE inline
#endif

#ifndef OPENXR_HPP_CONSTEXPR
#define OPENXR_HPP_CONSTEXPR constexpr
#endif

namespace OPENXR_HPP_NAMESPACE {{
"#, version = env!("CARGO_PKG_VERSION"), guard = config.include_guard, namespace = config.namespace)
}

fn write_epilogue(writer: &mut impl io::Write, config: &Config) -> io::Result<()> {
	write!(writer, r#"
}}  // namespace OPENXR_HPP_NAMESPACE

#endif  // {}
"#, config.include_guard)
}

/// Opens the preprocessor guard of a platform specific entity.
///
/// A protect list like `A,B` requires all of its macros.
pub fn write_protect_begin(writer: &mut dyn io::Write, protect: Option<&str>) -> io::Result<()> {
	if let Some(protect) = protect {
		let cond = protect.split(',')
			.map(|p| format!("defined({})", p.trim()))
			.collect::<Vec<_>>()
			.join(" && ");
		writeln!(writer, "#if {}", cond)?;
	}
	Ok(())
}

pub fn write_protect_end(writer: &mut dyn io::Write, protect: Option<&str>) -> io::Result<()> {
	if let Some(protect) = protect {
		writeln!(writer, "#endif  // {}", protect)?;
	}
	Ok(())
}

/// Writes a registry comment as doxygen lines.
pub fn write_comment(writer: &mut dyn io::Write, comment: Option<&str>) -> io::Result<()> {
	write_comment_pre(writer, "//!", comment)
}

pub fn write_comment_pre(writer: &mut dyn io::Write, pre: &str, comment: Option<&str>) -> io::Result<()> {
	if let Some(comment) = comment {
		for l in comment.lines().map(str::trim).filter(|l| !l.is_empty()) {
			writeln!(writer, "{} {}", pre, l)?;
		}
	}
	Ok(())
}

/// Orders the wrapped structs so that every struct comes after the structs it
/// contains by value. Base headers come first, otherwise declaration order is
/// kept where possible.
pub fn dependency_order(registry: &Registry) -> Result<Vec<&StructDescriptor>, Error> {
	#[derive(Copy, Clone, Eq, PartialEq)]
	enum Mark { None, Visiting, Done }
	
	struct Walk<'a> {
		registry: &'a Registry,
		structs:  Vec<&'a StructDescriptor>,
		index:    HashMap<&'a str, usize>,
		marks:    Vec<Mark>,
		order:    Vec<&'a StructDescriptor>
	}
	
	impl<'a> Walk<'a> {
		/// Follows struct aliases to the wrapped struct.
		fn resolve(&self, name: &str) -> Option<usize> {
			self.index.get(name).copied().or_else(|| self.registry.find_alias(name)
				.filter(|a| a.kind == AliasKind::Struct)
				.and_then(|a| a.target.as_deref())
				.and_then(|target| self.index.get(target).copied()))
		}
		
		fn visit(&mut self, i: usize) -> Result<(), Error> {
			match self.marks[i] {
				Mark::Done => return Ok(()),
				Mark::Visiting => return Err(Error::DependencyCycle { name: self.structs[i].name.clone() }),
				Mark::None => ()
			}
			
			self.marks[i] = Mark::Visiting;
			let s = self.structs[i];
			for m in s.members.iter().filter(|m| !m.is_pointer()) {
				if let Some(j) = self.resolve(&m.r#type) {
					self.visit(j)?;
				}
			}
			
			self.marks[i] = Mark::Done;
			self.order.push(s);
			Ok(())
		}
	}
	
	let structs = registry.structs.iter()
		.filter(|s| !s.is_marker())
		.collect::<Vec<_>>();
	
	let mut walk = Walk {
		registry,
		index:  structs.iter().copied().enumerate().map(|(i, s)| (s.name.as_str(), i)).collect(),
		marks:  vec![Mark::None; structs.len()],
		order:  Vec::with_capacity(structs.len()),
		structs
	};
	
	// base headers first
	let (headers, others): (Vec<usize>, Vec<usize>) = (0..walk.structs.len())
		.partition(|&i| walk.structs[i].is_base_header());
	
	for i in headers.into_iter().chain(others) {
		walk.visit(i)?;
	}
	
	Ok(walk.order)
}

/// Expands a single template into a string.
#[cfg(test)]
pub(crate) fn expand_to_string(template: &dyn Template, registry: &Registry) -> String {
	let config = Config::default();
	let mut buf = Vec::<u8>::new();
	template.expand(&Context::new(registry, &config), &mut buf).expect("failed to expand template");
	String::from_utf8(buf).expect("template wrote invalid utf-8")
}

#[cfg(test)]
mod tests {
	use {super::*, crate::test_data::registry, pretty_assertions::assert_eq};
	
	fn position(order: &[&StructDescriptor], name: &str) -> usize {
		order.iter().position(|s| s.name == name).unwrap()
	}
	
	#[test]
	fn orders_structs_by_value_dependencies() {
		let registry = registry();
		let order = dependency_order(&registry).unwrap();
		
		assert!(position(&order, "XrVector3f") < position(&order, "XrPosef"));
		assert!(position(&order, "XrQuaternionf") < position(&order, "XrPosef"));
		assert!(position(&order, "XrPosef") < position(&order, "XrReferenceSpaceCreateInfo"));
		assert!(position(&order, "XrApplicationInfo") < position(&order, "XrInstanceCreateInfo"));
		assert!(order.iter().all(|s| !s.is_marker()));
		assert_eq!(order.len(), registry.structs.len() - 1);
	}
	
	#[test]
	fn rejects_by_value_cycles() {
		let mut registry = registry();
		let a = MemberDescriptor { name: "b".into(), r#type: "XrB".into(), ..Default::default() };
		let b = MemberDescriptor { name: "a".into(), r#type: "XrA".into(), ..Default::default() };
		for (name, member) in [("XrA", a), ("XrB", b)] {
			registry.structs.push(StructDescriptor {
				name:          name.into(),
				category:      StructCategory::Struct,
				members:       vec![member],
				returned_only: false,
				parent:        None,
				protect:       None,
				comment:       None
			});
		}
		
		match dependency_order(&registry) {
			Err(Error::DependencyCycle { name }) => assert_eq!(name, "XrA"),
			other => panic!("expected a dependency cycle, got {:?}", other.map(|v| v.len()))
		}
	}
	
	#[test]
	fn pointers_do_not_create_dependencies() {
		let mut registry = registry();
		registry.structs.push(StructDescriptor {
			name:          "XrSelf".into(),
			category:      StructCategory::Struct,
			members:       vec![MemberDescriptor { name: "next".into(), r#type: "XrSelf".into(), pointer: "*".into(), ..Default::default() }],
			returned_only: false,
			parent:        None,
			protect:       None,
			comment:       None
		});
		
		assert!(dependency_order(&registry).is_ok());
	}
	
	#[test]
	fn writes_protect_guards() {
		let mut buf = Vec::<u8>::new();
		write_protect_begin(&mut buf, Some("XR_USE_PLATFORM_WIN32,XR_USE_GRAPHICS_API_OPENGL")).unwrap();
		write_protect_end(&mut buf, Some("XR_USE_PLATFORM_WIN32,XR_USE_GRAPHICS_API_OPENGL")).unwrap();
		write_protect_begin(&mut buf, None).unwrap();
		
		assert_eq!(String::from_utf8(buf).unwrap(), "\
#if defined(XR_USE_PLATFORM_WIN32) && defined(XR_USE_GRAPHICS_API_OPENGL)
#endif  // XR_USE_PLATFORM_WIN32,XR_USE_GRAPHICS_API_OPENGL
");
	}
	
	#[test]
	fn wraps_passes_in_namespace_and_guard() {
		let registry = registry();
		let mut buf = Vec::<u8>::new();
		gen(&mut buf, &registry, &Config::default()).unwrap();
		let header = String::from_utf8(buf).unwrap();
		
		assert!(header.starts_with("// MACHINE GENERATED FILE, DO NOT EDIT!\n"));
		assert!(header.contains("#define OPENXR_HPP_NAMESPACE xr\n"));
		assert!(header.contains("namespace OPENXR_HPP_NAMESPACE {\n"));
		assert!(header.ends_with("}  // namespace OPENXR_HPP_NAMESPACE\n\n#endif  // OPENXR_HPP_GENERATED_H_\n"));
		
		let enums = header.find("enum class StructureType").unwrap();
		let aliases = header.find("using Space = XrSpace;").unwrap();
		let values = header.find("class Duration {").unwrap();
		let structs = header.find("struct InstanceCreateInfo : ").unwrap();
		assert!(enums < aliases && aliases < values && values < structs);
		
		assert_eq!(header.matches("#if ").count(), header.matches("#endif").count() - 4);
	}
}
