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

//! The registry model: the parts of `xr.xml` needed to project the C API into C++ wrappers.

use {
	serde::{*, de::Error},
	crate::xml::Body,
	std::collections::{HashMap, HashSet},
	tracing::{debug, trace}
};

#[derive(Debug, Default, Clone)]
pub struct Registry {
	/// Vendor tags, e.g. `KHR`, `EXT`, `MSFT`.
	pub tags:    Vec<String>,
	pub structs: Vec<StructDescriptor>,
	pub enums:   Vec<EnumDescriptor>,
	pub aliases: Vec<AliasDescriptor>
}

impl Registry {
	pub fn find_struct(&self, name: &str) -> Option<&StructDescriptor> {
		self.structs.iter().find(|s| s.name == name)
	}
	
	pub fn find_enum(&self, name: &str) -> Option<&EnumDescriptor> {
		self.enums.iter().find(|e| e.name == name)
	}
	
	pub fn find_alias(&self, name: &str) -> Option<&AliasDescriptor> {
		self.aliases.iter().find(|a| a.name == name)
	}
}

#[derive(Debug, Deserialize, Eq, PartialEq, Copy, Clone)]
#[serde(rename_all = "lowercase")]
pub enum StructCategory {
	Struct,
	Union
}

impl std::fmt::Display for StructCategory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Struct => f.write_str("struct"),
			Self::Union => f.write_str("union")
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDescriptor {
	pub name:          String,
	pub category:      StructCategory,
	pub members:       Vec<MemberDescriptor>,
	pub returned_only: bool,
	/// The base header this struct can be passed as (`parentstruct`).
	pub parent:        Option<String>,
	/// Preprocessor symbol guarding this struct in `openxr.h`.
	pub protect:       Option<String>,
	pub comment:       Option<String>
}

impl StructDescriptor {
	fn type_member(&self) -> Option<&MemberDescriptor> {
		self.members.first()
			.filter(|m| m.name == "type" && m.r#type == STRUCTURE_TYPE && !m.is_pointer())
	}
	
	/// True if the first member is an `XrStructureType` discriminant.
	pub fn is_typed(&self) -> bool {
		self.type_member().is_some()
	}
	
	/// The `XrStructureType` enumerator fixed for this struct, if any.
	pub fn tag(&self) -> Option<&str> {
		self.type_member().and_then(|m| m.values.as_deref())
	}
	
	/// A typed struct whose tag is chosen by the caller.
	pub fn is_intermediate(&self) -> bool {
		self.is_typed() && self.tag().is_none()
	}
	
	pub fn is_base_header(&self) -> bool {
		self.name.ends_with("BaseHeader")
	}
	
	/// `XrBaseInStructure` and friends, only used for chain traversal.
	pub fn is_marker(&self) -> bool {
		self.name.starts_with("XrBase")
	}
	
	/// Members owned by `TypedStructTraits` instead of the wrapper itself.
	pub fn is_hidden(&self, member: &MemberDescriptor) -> bool {
		self.is_typed() && (member.name == "type" || member.name == "next")
	}
	
	pub fn visible_members(&self) -> impl Iterator<Item = &MemberDescriptor> + '_ {
		self.members.iter().filter(move |m| !self.is_hidden(m))
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberDescriptor {
	pub name:     String,
	pub r#type:   String,
	/// The pointee (or the value) is `const`.
	pub is_const: bool,
	/// Pointer declarator between type and name, e.g. `*` or `* const*`.
	pub pointer:  String,
	/// Fixed array dimensions, outermost first.
	pub array:    Vec<String>,
	pub values:   Option<String>,
	pub optional: bool,
	pub len:      Option<String>,
	pub comment:  Option<String>
}

impl MemberDescriptor {
	pub fn is_pointer(&self) -> bool {
		!self.pointer.is_empty()
	}
	
	pub fn is_array(&self) -> bool {
		!self.array.is_empty()
	}
	
	/// A `char name[N]` buffer holding a null terminated string.
	pub fn is_static_length_string(&self) -> bool {
		self.r#type == "char" && !self.is_pointer() && self.array.len() == 1
	}
	
	/// The declared bound of the outermost array dimension.
	pub fn array_count_var(&self) -> Option<&str> {
		self.array.first().map(String::as_str)
	}
}

#[derive(Debug, Deserialize, Eq, PartialEq, Copy, Clone)]
#[serde(rename_all = "lowercase")]
pub enum EnumKind {
	Enum,
	Bitmask,
	#[serde(other)]
	Constants
}

impl Default for EnumKind {
	fn default() -> Self {
		Self::Constants
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
	pub name:    String,
	pub kind:    EnumKind,
	pub comment: Option<String>,
	pub values:  Vec<EnumValue>,
	/// Macros guarding the enum, taken from the extension requiring it.
	pub protect: Option<String>
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnumValue {
	pub name:    String,
	pub alias:   Option<String>,
	pub comment: Option<String>
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AliasKind {
	Handle,
	Bitmask,
	Basetype,
	/// `<type category="struct" name=".." alias=".."/>`
	Struct
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasDescriptor {
	pub kind:    AliasKind,
	pub name:    String,
	/// The aliased or underlying type, if the registry names one.
	pub target:  Option<String>,
	pub protect: Option<String>
}

pub const STRUCTURE_TYPE: &str = "XrStructureType";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RegistryVariant {
	Tags(Vec<TagsVariant>),
	Types(Vec<TypesVariant>),
	Enums(#[serde(deserialize_with = "deserialize_enums")] EnumDescriptor),
	Feature(Feature),
	Extensions(Vec<ExtensionsVariant>),
	#[serde(other)]
	Other
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TagsVariant {
	Tag { name: String },
	#[serde(other)]
	Other
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TypesVariant {
	Type(XrType),
	#[serde(other)]
	Other
}

#[derive(Debug, Deserialize, Eq, PartialEq, Copy, Clone)]
#[serde(rename_all = "lowercase")]
enum TypeCategory {
	Struct,
	Union,
	Handle,
	Bitmask,
	Basetype,
	#[serde(other)]
	Other
}

#[derive(Debug)]
enum XrType {
	Struct(StructDescriptor),
	Alias(AliasDescriptor),
	Other
}

#[derive(Debug)]
struct Feature {
	require: Vec<Vec<RequireVariant>>
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ExtensionsVariant {
	Extension(Extension),
	#[serde(other)]
	Other
}

#[derive(Debug)]
struct Extension {
	name:      String,
	supported: String,
	protect:   Option<String>,
	require:   Vec<Vec<RequireVariant>>
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RequireVariant {
	Enum {
		name:    String,
		extends: Option<String>
	},
	Type { name: String },
	#[serde(other)]
	Other
}

/// Text that is either stored in an attribute or in a child tag.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextVariant {
	Attr(String),
	Body(Body<String>)
}

#[allow(clippy::from_over_into)]
impl Into<String> for TextVariant {
	fn into(self) -> String {
		match self {
			Self::Attr(v) => v,
			Self::Body(v) => v.value
		}
	}
}

impl<'de> Deserialize<'de> for Registry {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let mut tags = Vec::new();
		let mut structs = Vec::new();
		let mut aliases = Vec::new();
		let mut enums = Vec::new();
		let mut features = Vec::new();
		let mut extensions = Vec::new();
		
		for e in Vec::<RegistryVariant>::deserialize(deserializer)? {
			match e {
				RegistryVariant::Tags(v) => tags.extend(v.into_iter().filter_map(|t| match t {
					TagsVariant::Tag { name } => Some(name),
					TagsVariant::Other => None
				})),
				RegistryVariant::Types(types) => for ty in types {
					match ty {
						TypesVariant::Type(XrType::Struct(s)) => structs.push(s),
						TypesVariant::Type(XrType::Alias(a)) => aliases.push(a),
						_ => ()
					}
				},
				RegistryVariant::Enums(v) => enums.push(v),
				RegistryVariant::Feature(v) => features.push(v),
				RegistryVariant::Extensions(v) => extensions.extend(v.into_iter().filter_map(|e| match e {
					ExtensionsVariant::Extension(e) => Some(e),
					ExtensionsVariant::Other => None
				})),
				RegistryVariant::Other => ()
			}
		}
		
		let (enabled, disabled): (Vec<_>, Vec<_>) = extensions.into_iter()
			.partition(|e| e.supported != "disabled");
		
		// (protect, requirements) of everything that ends up in `openxr.h`
		let requirements = features.iter()
			.map(|f| (None, &f.require))
			.chain(enabled.iter().map(|e| (e.protect.as_deref(), &e.require)))
			.collect::<Vec<_>>();
		
		let mut protects = HashMap::<&str, Option<&str>>::new();
		let mut required = HashSet::<&str>::new();
		
		for (protect, require) in &requirements {
			for e in require.iter().flatten() {
				match e {
					RequireVariant::Type { name } => {
						required.insert(name.as_str());
						protects.entry(name.as_str())
							.and_modify(|p| if *p != *protect { *p = None })
							.or_insert(*protect);
					}
					RequireVariant::Enum { name, extends: Some(extends) } => {
						if let Some(enums) = enums.iter_mut().find(|e: &&mut EnumDescriptor| &e.name == extends) {
							if !enums.values.iter().any(|v| &v.name == name) {
								trace!(name = name.as_str(), extends = extends.as_str(), "extending enum");
								enums.values.push(EnumValue { name: name.clone(), alias: None, comment: None });
							}
						}
					}
					_ => ()
				}
			}
		}
		
		// types that only exist for extensions that are not part of the header
		let excluded = disabled.iter()
			.flat_map(|e| e.require.iter().flatten())
			.filter_map(|e| match e {
				RequireVariant::Type { name } if !required.contains(name.as_str()) => Some(name.as_str()),
				_ => None
			})
			.collect::<HashSet<_>>();
		
		for ext in &disabled {
			debug!(extension = ext.name.as_str(), "skipping disabled extension");
		}
		
		let structs = structs.into_iter()
			.filter(|s| !excluded.contains(s.name.as_str()))
			.map(|mut s| {
				if s.protect.is_none() {
					s.protect = protects.get(s.name.as_str()).copied().flatten().map(String::from);
				}
				s
			})
			.collect();
		
		let aliases = aliases.into_iter()
			.filter(|a| !excluded.contains(a.name.as_str()))
			.map(|mut a| {
				if a.protect.is_none() {
					a.protect = protects.get(a.name.as_str()).copied().flatten().map(String::from);
				}
				a
			})
			.collect();
		
		let enums = enums.into_iter()
			.filter(|e| !excluded.contains(e.name.as_str()))
			.map(|mut e| {
				e.protect = protects.get(e.name.as_str()).copied().flatten().map(String::from);
				e
			})
			.collect();
		
		Ok(Self { tags, structs, enums, aliases })
	}
}

impl<'de> Deserialize<'de> for XrType {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(rename_all = "lowercase")]
		enum Val {
			Category(TypeCategory),
			Name(TextVariant),
			Member(MemberDescriptor),
			#[serde(alias = "type")]
			Alias(TextVariant),
			ReturnedOnly(bool),
			ParentStruct(String),
			Protect(String),
			Comment(TextVariant),
			#[serde(other)]
			Other
		}
		
		let mut category = None;
		let mut name = None;
		let mut alias = None;
		let mut returned_only = false;
		let mut parent = None;
		let mut protect = None;
		let mut comment = None;
		let mut members = Vec::new();
		
		for e in Vec::<Val>::deserialize(deserializer)? {
			match e {
				Val::Category(v) => category = Some(v),
				Val::Name(v) => name = Some(v.into()),
				Val::Alias(v) => alias = Some(v.into()),
				Val::ReturnedOnly(v) => returned_only = v,
				Val::ParentStruct(v) => parent = Some(v),
				Val::Protect(v) => protect = Some(v),
				Val::Comment(TextVariant::Attr(v)) => comment = Some(v),
				Val::Member(v) => members.push(v),
				_ => ()
			}
		}
		
		let name: String = match name {
			Some(name) => name,
			None => return Ok(XrType::Other)
		};
		
		Ok(match (category, alias) {
			(Some(TypeCategory::Struct), Some(alias)) => XrType::Alias(AliasDescriptor {
				kind:   AliasKind::Struct,
				name,
				target: Some(alias),
				protect
			}),
			(Some(category @ TypeCategory::Struct), None) | (Some(category @ TypeCategory::Union), None) => XrType::Struct(StructDescriptor {
				name,
				category: if category == TypeCategory::Union { StructCategory::Union } else { StructCategory::Struct },
				members,
				returned_only,
				parent,
				protect,
				comment
			}),
			(Some(TypeCategory::Handle), target) => XrType::Alias(AliasDescriptor { kind: AliasKind::Handle, name, target, protect }),
			(Some(TypeCategory::Bitmask), target) => XrType::Alias(AliasDescriptor { kind: AliasKind::Bitmask, name, target, protect }),
			(Some(TypeCategory::Basetype), target) => XrType::Alias(AliasDescriptor { kind: AliasKind::Basetype, name, target, protect }),
			_ => XrType::Other
		})
	}
}

impl<'de> Deserialize<'de> for MemberDescriptor {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(rename_all = "lowercase")]
		enum Val {
			Type(Body<String>),
			Name(Body<String>),
			Comment(Body<String>),
			#[serde(rename = "$value")]
			Body(String),
			Enum(Body<String>),
			Optional(String),
			Len(String),
			Values(String),
			#[serde(other)]
			Other
		}
		
		let mut member = MemberDescriptor::default();
		let mut r#type = None;
		let mut name = None;
		
		// declarator text before the type, between type and name and after the name
		let mut prefix = String::new();
		let mut pointer = String::new();
		let mut suffix = String::new();
		
		for e in Vec::<Val>::deserialize(deserializer)? {
			let text = match e {
				Val::Type(v) => { r#type = Some(v.value); continue; }
				Val::Name(v) => { name = Some(v.value); continue; }
				Val::Comment(v) => { member.comment = Some(v.value); continue; }
				Val::Optional(v) => { member.optional = v.split(',').next() == Some("true"); continue; }
				Val::Len(v) => { member.len = Some(v); continue; }
				Val::Values(v) => { member.values = Some(v); continue; }
				Val::Body(v) | Val::Enum(Body { value: v }) => v,
				Val::Other => continue
			};
			
			match (&r#type, &name) {
				(_, Some(_)) => suffix.push_str(&text),
				(Some(_), None) => pointer.push_str(&text),
				(None, None) => {
					prefix.push_str(&text);
					prefix.push(' ');
				}
			}
		}
		
		member.r#type = r#type.ok_or_else(|| D::Error::missing_field("type"))?;
		member.name = name.ok_or_else(|| D::Error::missing_field("name"))?;
		member.is_const = prefix.split_whitespace().any(|t| t == "const");
		member.pointer = pointer.trim().to_string();
		member.array = parse_array(&suffix);
		Ok(member)
	}
}

impl<'de> Deserialize<'de> for Feature {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(rename_all = "lowercase")]
		enum Val {
			Require(Vec<RequireVariant>),
			#[serde(other)]
			Other
		}
		
		let require = Vec::<Val>::deserialize(deserializer)?
			.into_iter()
			.filter_map(|e| match e {
				Val::Require(v) => Some(v),
				Val::Other => None
			})
			.collect();
		
		Ok(Self { require })
	}
}

impl<'de> Deserialize<'de> for Extension {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(rename_all = "lowercase")]
		enum Val {
			Name(String),
			Supported(String),
			Protect(String),
			Require(Vec<RequireVariant>),
			#[serde(other)]
			Other
		}
		
		let mut name = None;
		let mut supported = None;
		let mut protect = None;
		let mut require = Vec::new();
		
		for e in Vec::<Val>::deserialize(deserializer)? {
			match e {
				Val::Name(v) => name = Some(v),
				Val::Supported(v) => supported = Some(v),
				Val::Protect(v) => protect = Some(v),
				Val::Require(v) => require.push(v),
				Val::Other => ()
			}
		}
		
		Ok(Self {
			name:      name.ok_or_else(|| D::Error::missing_field("name"))?,
			supported: supported.ok_or_else(|| D::Error::missing_field("supported"))?,
			protect,
			require
		})
	}
}

fn deserialize_enums<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EnumDescriptor, D::Error> {
	#[derive(Deserialize)]
	#[serde(rename_all = "lowercase")]
	enum Val {
		Name(String),
		Type(EnumKind),
		Comment(TextVariant),
		Enum(EnumValue),
		#[serde(other)]
		Other
	}
	
	let mut name = None;
	let mut kind = None;
	let mut comment = None;
	let mut values = Vec::new();
	
	for e in Vec::<Val>::deserialize(deserializer)? {
		match e {
			Val::Name(v) => name = Some(v),
			Val::Type(v) => kind = Some(v),
			Val::Comment(TextVariant::Attr(v)) => comment = Some(v),
			Val::Enum(v) => values.push(v),
			_ => ()
		}
	}
	
	Ok(EnumDescriptor {
		name: name.ok_or_else(|| D::Error::missing_field("name"))?,
		kind: kind.unwrap_or_default(),
		comment,
		values,
		protect: None
	})
}

/// splits `[A][B]` into `["A", "B"]`
fn parse_array(s: &str) -> Vec<String> {
	s.split(|ch| ch == '[' || ch == ']')
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(String::from)
		.collect()
}
