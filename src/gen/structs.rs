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

//! Wrappers around the raw structs, layout compatible with `openxr.h`.

use {super::*, tracing::{trace, warn}};

/// Filled in by the runtime, although not marked `returnedonly`.
const EVENT_DATA_BUFFER: &str = "XrEventDataBuffer";

const TYPED_STRUCT_TRAITS: &str = r#"
namespace traits {

//! Common header of every struct carrying a `StructureType`.
template <typename Type>
class TypedStructTraits {
protected:
	TypedStructTraits(StructureType type_) : type(type_) {}

public:
	StructureType type;
	const void* next{nullptr};
};

}  // namespace traits
"#;

pub struct StructTemplate;

impl Template for StructTemplate {
	fn name(&self) -> &'static str {
		"structs"
	}
	
	fn expand(&self, ctx: &Context, writer: &mut dyn io::Write) -> Result<(), Error> {
		let order = dependency_order(ctx.registry)?;
		
		if order.iter().any(|s| s.is_typed()) {
			if ctx.registry.find_enum(STRUCTURE_TYPE).is_none() {
				return Err(Error::MissingStructureType);
			}
			writer.write_all(TYPED_STRUCT_TRAITS.as_bytes())?;
		}
		
		writeln!(writer)?;
		for s in &order {
			write_protect_begin(writer, s.protect.as_deref())?;
			writeln!(writer, "{} {};", s.category, ctx.projector.type_name(&s.name))?;
			write_protect_end(writer, s.protect.as_deref())?;
		}
		
		// aliases name the forward declarations, members of alias type may follow
		write_struct_aliases(ctx, writer)?;
		
		for s in order {
			trace!(name = s.name.as_str(), "emitting struct");
			write_protect_begin(writer, s.protect.as_deref())?;
			if s.is_base_header() {
				write_base_header(ctx, writer, s)?;
			} else {
				write_wrapper(ctx, writer, s)?;
			}
			write_protect_end(writer, s.protect.as_deref())?;
		}
		Ok(())
	}
}

/// A plain struct with every member, usable as the pointee of polymorphic pointers.
fn write_base_header(ctx: &Context, writer: &mut dyn io::Write, s: &StructDescriptor) -> io::Result<()> {
	let name = ctx.projector.type_name(&s.name);
	
	writeln!(writer)?;
	write_comment(writer, s.comment.as_deref())?;
	writeln!(writer, "{} {} {{", s.category, name)?;
	for m in &s.members {
		writeln!(writer, "\t{};", ctx.projector.member_decl(m))?;
	}
	writeln!(writer, "}};")?;
	writeln!(writer, "static_assert(sizeof({}) == sizeof({}), \"struct and wrapper have different size!\");", name, s.name)
}

fn write_wrapper(ctx: &Context, writer: &mut dyn io::Write, s: &StructDescriptor) -> io::Result<()> {
	let (name, raw) = (ctx.projector.type_name(&s.name), s.name.as_str());
	
	writeln!(writer)?;
	match s.comment.as_deref() {
		Some(comment) => write_comment(writer, Some(comment))?,
		None => writeln!(writer, "//! C++ wrapper for {}", raw)?
	}
	
	if s.is_typed() {
		write!(writer, "{category} {name} : public traits::TypedStructTraits<{name}> {{
private:
	using Parent = traits::TypedStructTraits<{name}>;

public:
", category = s.category, name = name)?;
	} else {
		writeln!(writer, "{} {} {{", s.category, name)?;
	}
	
	if s.category == StructCategory::Struct {
		write_constructor(writer, name, &Constructor::new(&ctx.projector, s))?;
		writeln!(writer)?;
	}
	
	write!(writer, "\toperator const {raw}&() const {{ return *reinterpret_cast<const {raw}*>(this); }}
	operator {raw}&() {{ return *reinterpret_cast<{raw}*>(this); }}
", raw = raw)?;
	
	let mut members = s.visible_members().peekable();
	if members.peek().is_some() {
		writeln!(writer)?;
	}
	for m in members {
		write_comment_pre(writer, "\t//!", m.comment.as_deref())?;
		writeln!(writer, "\t{};", ctx.projector.member_decl(m))?;
	}
	
	write!(writer, r#"}};
static_assert(sizeof({name}) == sizeof({raw}), "struct and wrapper have different size!");

//! @brief Free function accessor for {name} const reference as a raw {raw} const pointer
//! @relates {name}
OPENXR_HPP_INLINE {raw} const* get({name} const& h) {{
	return &(h.operator {raw} const&());
}}

//! @brief Free function accessor for passing {name} as the address of a raw {raw}
//! @relates {name}
OPENXR_HPP_INLINE {raw}* put({name}& h) {{
	return &(h.operator {raw}&());
}}
"#, name = name, raw = raw)
}

/// The pieces of a generated constructor.
#[derive(Debug, Default)]
struct Constructor<'a> {
	params: Vec<String>,
	inits:  Vec<String>,
	/// Fixed length strings filled from `const char*` parameters.
	copies: Vec<&'a MemberDescriptor>
}

impl<'a> Constructor<'a> {
	fn new(p: &Projector, s: &'a StructDescriptor) -> Self {
		let mut ctor = Self::default();
		
		match s.tag() {
			// filled in by the runtime, only the tag is set
			Some(tag) if s.returned_only || s.name == EVENT_DATA_BUFFER => {
				ctor.inits.push(format!("Parent({})", p.tag(tag)));
				return ctor;
			}
			Some(tag) => ctor.inits.push(format!("Parent({})", p.tag(tag))),
			None if s.is_intermediate() => {
				ctor.params.push(format!("{} type_", p.type_name(STRUCTURE_TYPE)));
				ctor.inits.push("Parent(type_)".to_string());
				return ctor;
			}
			None => ()
		}
		
		for m in s.visible_members() {
			if m.is_static_length_string() {
				ctor.params.push(p.param_decl(m));
				ctor.copies.push(m);
			} else if m.is_array() {
				ctor.inits.push(format!("{}{{}}", m.name));
			} else {
				ctor.params.push(p.param_decl(m));
				ctor.inits.push(format!("{0}{{{0}_}}", m.name));
			}
		}
		
		ctor
	}
}

fn write_constructor(writer: &mut dyn io::Write, name: &str, ctor: &Constructor) -> io::Result<()> {
	if ctor.params.is_empty() {
		write!(writer, "\t{}()", name)?;
	} else {
		write!(writer, "\t{}(\n\t\t{})", name, ctor.params.join(",\n\t\t"))?;
	}
	
	if !ctor.inits.is_empty() {
		write!(writer, "\n\t\t: {}", ctor.inits.join(",\n\t\t  "))?;
	}
	
	if ctor.copies.is_empty() {
		return writeln!(writer, " {{}}");
	}
	
	writeln!(writer, " {{")?;
	for m in &ctor.copies {
		let bound = m.array_count_var().unwrap_or_default();
		writeln!(writer, "\t\tif (nullptr != {0}_) {{\n\t\t\tstrncpy({0}, {0}_, {1});\n\t\t}}", m.name, bound)?;
	}
	writeln!(writer, "\t}}")
}

fn write_struct_aliases(ctx: &Context, writer: &mut dyn io::Write) -> io::Result<()> {
	let aliases = ctx.registry.aliases.iter().filter(|a| a.kind == AliasKind::Struct);
	
	for a in aliases {
		let target = match a.target.as_deref().and_then(|t| ctx.registry.find_struct(t)) {
			Some(target) if !target.is_marker() => target,
			_ => {
				warn!(name = a.name.as_str(), "skipping alias of an unknown struct");
				continue;
			}
		};
		
		let protect = a.protect.as_deref().or(target.protect.as_deref());
		write_protect_begin(writer, protect)?;
		writeln!(writer, "using {} = {};", ctx.projector.type_name(&a.name), ctx.projector.type_name(&target.name))?;
		write_protect_end(writer, protect)?;
	}
	Ok(())
}
