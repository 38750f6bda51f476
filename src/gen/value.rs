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

//! Value classes around opaque arithmetic scalars.

use {super::*, tracing::trace};

/// Additional operators and functions of a value type.
#[derive(Debug, Copy, Clone)]
pub enum Extra {
	/// `T& operator{op}=(Rhs)` member
	CompoundAssign { op: char, rhs: &'static str },
	/// `T operator-() const` member
	Negate,
	/// `static T name()` member returning a raw constant
	Constant { name: &'static str, raw: &'static str, doc: &'static str },
	/// free `Result operator{op}(Lhs, Rhs)`
	Binary { op: char, lhs: &'static str, rhs: &'static str, result: &'static str, doc: &'static str }
}

#[derive(Debug)]
pub struct ValueType {
	/// The raw base type, e.g. `XrTime`.
	pub raw:      &'static str,
	pub doc:      &'static str,
	/// Raw types that must be wrapped as well for the extras to make sense.
	pub requires: &'static [&'static str],
	/// Assigned by `put()`, the zero value if `None`.
	pub invalid:  Option<&'static str>,
	/// `operator bool` and `operator!` expressions, for types with a "set" state.
	pub validity: Option<(&'static str, &'static str)>,
	pub extras:   &'static [Extra]
}

const COMPARISONS: &[&str] = &["<", ">", "<=", ">=", "==", "!="];

/// The value types in header order.
pub static VALUE_TYPES: &[ValueType] = &[
	ValueType {
		raw:      "XrDuration",
		doc:      "Type-safe wrapper for XrDuration, a signed period of time in nanoseconds.",
		requires: &[],
		invalid:  None,
		validity: None,
		extras:   &[
			Extra::Negate,
			Extra::CompoundAssign { op: '+', rhs: "Duration" },
			Extra::CompoundAssign { op: '-', rhs: "Duration" },
			Extra::Constant { name: "infinite", raw: "XR_INFINITE_DURATION", doc: "The infinite duration, for timeouts that never expire." },
			Extra::Constant { name: "minHaptic", raw: "XR_MIN_HAPTIC_DURATION", doc: "The shortest haptic pulse the runtime supports." },
			Extra::Constant { name: "noDuration", raw: "XR_NO_DURATION", doc: "A zero duration." },
			Extra::Binary { op: '+', lhs: "Duration", rhs: "Duration", result: "Duration", doc: "Sum of two durations." },
			Extra::Binary { op: '-', lhs: "Duration", rhs: "Duration", result: "Duration", doc: "Difference of two durations." }
		]
	},
	ValueType {
		raw:      "XrTime",
		doc:      "Type-safe wrapper for XrTime, a point in time in nanoseconds.",
		requires: &["XrDuration"],
		invalid:  None,
		validity: Some(("val_ > 0", "val_ <= 0")),
		extras:   &[
			Extra::CompoundAssign { op: '+', rhs: "Duration" },
			Extra::CompoundAssign { op: '-', rhs: "Duration" },
			Extra::Binary { op: '-', lhs: "Time", rhs: "Time", result: "Duration", doc: "The duration between two times." },
			Extra::Binary { op: '-', lhs: "Time", rhs: "Duration", result: "Time", doc: "A time shifted back by a duration." },
			Extra::Binary { op: '+', lhs: "Time", rhs: "Duration", result: "Time", doc: "A time shifted forward by a duration." }
		]
	}
];

impl ValueType {
	/// The wrapper class name, `XrTime` -> `Time`.
	pub fn name(&self) -> &'static str {
		self.raw.strip_prefix("Xr").unwrap_or(self.raw)
	}
}

/// The value types whose raw types (and requirements) the registry defines.
pub fn emitted_value_types(registry: &Registry) -> impl Iterator<Item = &'static ValueType> + '_ {
	let defined = move |raw: &str| registry.find_alias(raw).map_or(false, |a| a.kind == AliasKind::Basetype);
	VALUE_TYPES.iter()
		.filter(move |v| defined(v.raw) && v.requires.iter().all(|r| defined(*r)))
}

/// Wraps `XrTime`, `XrDuration` and friends.
pub struct ValueTemplate;

impl Template for ValueTemplate {
	fn name(&self) -> &'static str {
		"value types"
	}
	
	fn expand(&self, ctx: &Context, writer: &mut dyn io::Write) -> Result<(), Error> {
		for v in emitted_value_types(ctx.registry) {
			trace!(name = v.raw, "emitting value type");
			write_value_type(writer, v)?;
		}
		Ok(())
	}
}

fn write_value_type(writer: &mut dyn io::Write, v: &ValueType) -> io::Result<()> {
	let (name, raw) = (v.name(), v.raw);
	
	write!(writer, r#"
//! {doc}
class {name} {{
public:
	//! Default (empty) constructor
	OPENXR_HPP_CONSTEXPR {name}() noexcept = default;

	//! Explicit constructor from raw {raw}
	OPENXR_HPP_CONSTEXPR explicit {name}({raw} v) noexcept : val_(v) {{}}
"#, doc = v.doc, name = name, raw = raw)?;
	
	if let Some((valid, invalid)) = v.validity {
		write!(writer, r#"
	//! True if this {name} is valid.
	OPENXR_HPP_CONSTEXPR explicit operator bool() const noexcept {{ return {valid}; }}

	//! True if this {name} is not valid.
	OPENXR_HPP_CONSTEXPR bool operator!() const noexcept {{ return {invalid}; }}
"#, name = name, valid = valid, invalid = invalid)?;
	}
	
	write!(writer, r#"
	//! Gets the raw {raw} type.
	OPENXR_HPP_CONSTEXPR {raw} get() const noexcept {{ return val_; }}

	//! Clears this value, then returns the address of the raw {raw} type, for use in creation/assignment.
	{raw}* put() noexcept {{
		val_ = {invalid};
		return &val_;
	}}
"#, raw = raw, invalid = v.invalid.unwrap_or("{}"))?;
	
	for extra in v.extras {
		match *extra {
			Extra::Negate => write!(writer, r#"
	//! Unary negation.
	OPENXR_HPP_CONSTEXPR {name} operator-() const noexcept {{ return {name}{{-val_}}; }}
"#, name = name)?,
			Extra::CompoundAssign { op, rhs } => write!(writer, r#"
	//! `{op}=` with a {rhs}.
	{name}& operator{op}=({rhs} d) noexcept {{
		val_ {op}= d.get();
		return *this;
	}}
"#, name = name, op = op, rhs = rhs)?,
			Extra::Constant { name: constant, raw: value, doc } => write!(writer, r#"
	//! {doc}
	static OPENXR_HPP_CONSTEXPR {name} {constant}() noexcept {{ return {name}{{{value}}}; }}
"#, name = name, constant = constant, value = value, doc = doc)?,
			Extra::Binary { .. } => ()
		}
	}
	
	write!(writer, r#"
private:
	{raw} val_{{}};
}};
static_assert(sizeof({name}) == sizeof({raw}), "raw type and wrapper have different size!");

//! @brief Free function for getting the raw {raw} from a {name}.
//! @relates {name}
OPENXR_HPP_INLINE OPENXR_HPP_CONSTEXPR {raw} get({name} const& v) noexcept {{ return v.get(); }}

//! @brief Free function for clearing and getting the raw {raw} from a {name}.
//! @relates {name}
OPENXR_HPP_INLINE {raw}* put({name}& v) noexcept {{ return v.put(); }}
"#, name = name, raw = raw)?;
	
	for op in COMPARISONS {
		write!(writer, r#"
//! @brief `{op}` comparison between {name} values.
//! @relates {name}
OPENXR_HPP_CONSTEXPR OPENXR_HPP_INLINE bool operator{op}({name} const& lhs, {name} const& rhs) noexcept {{ return lhs.get() {op} rhs.get(); }}
//! @brief `{op}` comparison between {name} and raw {raw}.
//! @relates {name}
OPENXR_HPP_CONSTEXPR OPENXR_HPP_INLINE bool operator{op}({name} const& lhs, {raw} rhs) noexcept {{ return lhs.get() {op} rhs; }}
//! @brief `{op}` comparison between raw {raw} and {name}.
//! @relates {name}
OPENXR_HPP_CONSTEXPR OPENXR_HPP_INLINE bool operator{op}({raw} lhs, {name} const& rhs) noexcept {{ return lhs {op} rhs.get(); }}
"#, op = op, name = name, raw = raw)?;
	}
	
	for extra in v.extras {
		if let Extra::Binary { op, lhs, rhs, result, doc } = *extra {
			write!(writer, r#"
//! @brief {doc}
//! @relates {lhs}
OPENXR_HPP_CONSTEXPR OPENXR_HPP_INLINE {result} operator{op}({lhs} const& lhs, {rhs} const& rhs) noexcept {{ return {result}{{lhs.get() {op} rhs.get()}}; }}
"#, op = op, lhs = lhs, rhs = rhs, result = result, doc = doc)?;
		}
	}
	
	Ok(())
}

#[cfg(test)]
mod tests {
	use {super::*, crate::test_data::registry};
	
	fn time_and_duration() -> String {
		expand_to_string(&ValueTemplate, &registry())
	}
	
	#[test]
	fn emits_duration_before_time() {
		let out = time_and_duration();
		let duration = out.find("class Duration {").unwrap();
		let time = out.find("class Time {").unwrap();
		assert!(duration < time);
	}
	
	#[test]
	fn time_is_valid_when_positive() {
		let out = time_and_duration();
		assert!(out.contains("OPENXR_HPP_CONSTEXPR explicit operator bool() const noexcept { return val_ > 0; }"));
		assert!(out.contains("OPENXR_HPP_CONSTEXPR bool operator!() const noexcept { return val_ <= 0; }"));
		// only `Time` has a validity check
		assert_eq!(out.matches("explicit operator bool").count(), 1);
	}
	
	#[test]
	fn writes_the_validity_expressions_as_given() {
		let version = ValueType {
			raw:      "XrVersion",
			doc:      "Packed version number.",
			requires: &[],
			invalid:  None,
			validity: Some(("val_ != 0", "val_ == 0")),
			extras:   &[]
		};
		
		let mut buf = Vec::<u8>::new();
		write_value_type(&mut buf, &version).unwrap();
		let out = String::from_utf8(buf).unwrap();
		assert!(out.contains("OPENXR_HPP_CONSTEXPR explicit operator bool() const noexcept { return val_ != 0; }"));
		assert!(out.contains("OPENXR_HPP_CONSTEXPR bool operator!() const noexcept { return val_ == 0; }"));
	}
	
	#[test]
	fn time_arithmetic_yields_the_right_types() {
		let out = time_and_duration();
		assert!(out.contains("Duration operator-(Time const& lhs, Time const& rhs) noexcept { return Duration{lhs.get() - rhs.get()}; }"));
		assert!(out.contains("Time operator+(Time const& lhs, Duration const& rhs) noexcept { return Time{lhs.get() + rhs.get()}; }"));
		assert!(out.contains("Time operator-(Time const& lhs, Duration const& rhs) noexcept { return Time{lhs.get() - rhs.get()}; }"));
		assert!(out.contains("\tTime& operator+=(Duration d) noexcept {\n\t\tval_ += d.get();\n\t\treturn *this;\n\t}\n"));
	}
	
	#[test]
	fn duration_has_constants_and_negation() {
		let out = time_and_duration();
		assert!(out.contains("static OPENXR_HPP_CONSTEXPR Duration infinite() noexcept { return Duration{XR_INFINITE_DURATION}; }"));
		assert!(out.contains("static OPENXR_HPP_CONSTEXPR Duration minHaptic() noexcept { return Duration{XR_MIN_HAPTIC_DURATION}; }"));
		assert!(out.contains("static OPENXR_HPP_CONSTEXPR Duration noDuration() noexcept { return Duration{XR_NO_DURATION}; }"));
		assert!(out.contains("OPENXR_HPP_CONSTEXPR Duration operator-() const noexcept { return Duration{-val_}; }"));
	}
	
	#[test]
	fn emits_all_comparisons_against_wrapper_and_raw() {
		let out = time_and_duration();
		for op in COMPARISONS {
			assert!(out.contains(&format!("bool operator{}(Time const& lhs, Time const& rhs)", op)));
			assert!(out.contains(&format!("bool operator{}(Time const& lhs, XrTime rhs)", op)));
			assert!(out.contains(&format!("bool operator{}(XrTime lhs, Time const& rhs)", op)));
		}
		assert_eq!(out.matches("OPENXR_HPP_INLINE bool operator").count(), 2 * 3 * COMPARISONS.len());
	}
	
	#[test]
	fn asserts_layout_and_emits_accessors() {
		let out = time_and_duration();
		assert!(out.contains("static_assert(sizeof(Time) == sizeof(XrTime), \"raw type and wrapper have different size!\");"));
		assert!(out.contains("OPENXR_HPP_INLINE OPENXR_HPP_CONSTEXPR XrTime get(Time const& v) noexcept { return v.get(); }"));
		assert!(out.contains("OPENXR_HPP_INLINE XrTime* put(Time& v) noexcept { return v.put(); }"));
		assert!(out.contains("\tXrTime* put() noexcept {\n\t\tval_ = {};\n\t\treturn &val_;\n\t}\n"));
	}
	
	#[test]
	fn skips_value_types_missing_from_the_registry() {
		let mut registry = registry();
		registry.aliases.retain(|a| a.name != "XrDuration");
		assert_eq!(emitted_value_types(&registry).count(), 0);
		assert!(expand_to_string(&ValueTemplate, &registry).is_empty());
	}
}
