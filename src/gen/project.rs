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

//! Projection of raw C names into the wrapper namespace.

use {
	crate::parse::*,
	std::{collections::{HashMap, HashSet}, fmt::Write}
};

/// Maps registry names to the names used in the generated header.
#[derive(Debug)]
pub struct Projector<'a> {
	tags:    &'a [String],
	/// Raw names that get a projected counterpart.
	known:   HashSet<&'a str>,
	/// `XrStructureType` enumerator -> struct using it as tag.
	tagged:  HashMap<&'a str, &'a str>
}

impl<'a> Projector<'a> {
	pub fn new(registry: &'a Registry) -> Self {
		let known = registry.structs.iter()
			.filter(|s| !s.is_marker())
			.map(|s| s.name.as_str())
			.chain(registry.enums.iter()
				.filter(|e| e.kind == EnumKind::Enum)
				.map(|e| e.name.as_str()))
			.chain(registry.aliases.iter().map(|a| a.name.as_str()))
			.collect();
		
		let tagged = registry.structs.iter()
			.filter_map(|s| s.tag().map(|tag| (tag, s.name.as_str())))
			.collect();
		
		Self { tags: &registry.tags, known, tagged }
	}
	
	/// `XrSomeStruct` -> `SomeStruct`, names without a wrapper are kept as they are.
	pub fn type_name<'b>(&self, name: &'b str) -> &'b str {
		match name.strip_prefix("Xr") {
			Some(stripped) if self.known.contains(name) && stripped.starts_with(|ch: char| ch.is_ascii_uppercase()) => stripped,
			_ => name
		}
	}
	
	/// The vendor tag a name ends with, if any.
	pub fn vendor_tag(&self, name: &str) -> Option<&'a str> {
		self.tags.iter()
			.filter(|tag| name.len() > tag.len() && name.ends_with(tag.as_str()))
			.max_by_key(|tag| tag.len())
			.map(String::as_str)
	}
	
	/// `XR_REFERENCE_SPACE_TYPE_STAGE` in `XrReferenceSpaceType` -> `Stage`
	pub fn enum_value(&self, enum_name: &str, value: &str) -> String {
		if enum_name == STRUCTURE_TYPE {
			if let Some(name) = self.tagged.get(value) {
				return self.type_name(name).to_string();
			}
		}
		
		let tag = self.vendor_tag(enum_name);
		let prefix = match enum_name {
			STRUCTURE_TYPE => "XR_TYPE_".to_string(),
			"XrResult" => "XR_".to_string(),
			name => screaming_snake_case(name.trim_end_matches(tag.unwrap_or(""))) + "_"
		};
		
		let mut body = value.strip_prefix(prefix.as_str())
			.or_else(|| value.strip_prefix("XR_"))
			.unwrap_or(value);
		
		// the enum's own vendor tag is implied
		if let Some(tag) = tag {
			body = body.strip_suffix(tag)
				.and_then(|s| s.strip_suffix('_'))
				.filter(|s| !s.is_empty())
				.unwrap_or(body);
		}
		
		let mut out = String::with_capacity(body.len());
		for word in body.split('_').filter(|w| !w.is_empty()) {
			if self.tags.iter().any(|tag| tag == word) {
				out.push_str(word);
				continue;
			}
			
			// `WIN32` -> `Win32`, `2D` -> `2D`
			let mut prev: Option<char> = None;
			for ch in word.chars() {
				out.push(match prev {
					Some(p) if !p.is_ascii_digit() => ch.to_ascii_lowercase(),
					_ => ch.to_ascii_uppercase()
				});
				prev = Some(ch);
			}
		}
		
		if out.starts_with(|ch: char| ch.is_ascii_digit()) {
			out.insert(0, 'e');
		}
		
		out
	}
	
	/// The `StructureType` constant for a struct tag.
	pub fn tag(&self, value: &str) -> String {
		format!("{}::{}", self.type_name(STRUCTURE_TYPE), self.enum_value(STRUCTURE_TYPE, value))
	}
	
	/// The member type without the declarator name, e.g. `const char* const*`.
	pub fn decl_type(&self, member: &MemberDescriptor) -> String {
		let mut s = String::new();
		if member.is_const {
			s.push_str("const ");
		}
		s.push_str(self.type_name(&member.r#type));
		s.push_str(&member.pointer);
		s
	}
	
	/// The member declaration inside the wrapper, e.g. `char applicationName[XR_MAX_APPLICATION_NAME_SIZE]`.
	pub fn member_decl(&self, member: &MemberDescriptor) -> String {
		let mut s = self.decl_type(member);
		s.push(' ');
		s.push_str(&member.name);
		for dim in &member.array {
			let _ = write!(s, "[{}]", dim);
		}
		s
	}
	
	/// The defaulted constructor parameter for a member, suffixed with `_`.
	pub fn param_decl(&self, member: &MemberDescriptor) -> String {
		if member.is_static_length_string() {
			return format!("const char* {}_ = nullptr", member.name);
		}
		
		let default = if member.is_pointer() { "nullptr" } else { "{}" };
		format!("{} {}_ = {}", self.decl_type(member), member.name, default)
	}
}

/// `XrReferenceSpaceType` -> `XR_REFERENCE_SPACE_TYPE`
pub fn screaming_snake_case(name: &str) -> String {
	let mut out = String::with_capacity(name.len() + 8);
	let mut prev: Option<char> = None;
	
	for ch in name.chars() {
		if ch.is_ascii_uppercase() && prev.map_or(false, |p| p.is_ascii_lowercase() || p.is_ascii_digit()) {
			out.push('_');
		}
		out.push(ch.to_ascii_uppercase());
		prev = Some(ch);
	}
	
	out
}
