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

//! A streaming serde deserializer for the subset of XML used by the registry.
//!
//! Attributes and child elements are both presented as map entries (or as
//! enum-tagged sequence elements), text content is presented under the
//! `$value` key.

use {
	std::{str::FromStr, io, mem, fmt},
	serde::{*, de::{self, *}, forward_to_deserialize_any},
	tracing::trace,
	self::State::*
};

const UNICODE_FILE_MAGIC_BYTES: [u8; 3] = [0xEF, 0xBB, 0xBF];

pub fn deserialize<'de, T: Deserialize<'de>, R: io::BufRead>(reader: R) -> Result<T, Error> {
	T::deserialize(&mut Deserializer::from_reader(reader))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Body<T> {
	#[serde(rename = "$value")]
	pub value: T
}

#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum State {
	/// The outer tag is yet to be parsed.
	Uninit,
	/// Reading a tag's name.
	TagKey,
	/// Indicates that the next value is a map, `true` if the tag has no attributes.
	TagValue(bool),
	/// Searching for attributes in a tag.
	AttrKey,
	/// An attribute value is to be parsed
	AttrValue,
	/// Reading the body of an xml tag while searching for inner tags.
	BodyValue,
	BodyKey
}

fn invalid_state(state: State, file: &'static str, line: u32) -> Error {
	Error::Custom(format!("invalid state: {:?}, {}:{}", state, file, line))
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0}")]
	Custom(String),
	#[error("invalid type `{0}`, expected `{1}`")]
	InvalidType(String, String),
	#[error("invalid value `{0}`, expected `{1}`")]
	InvalidValue(String, String),
	#[error("invalid length `{0}`, expected `{1}`")]
	InvalidLength(usize, String),
	#[error("unknown variant `{0}`, expected variants `{1:?}`")]
	UnknownVariant(String, &'static [&'static str]),
	#[error("unknown field `{0}`, expected fields `{1:?}`")]
	UnknownField(String, &'static [&'static str]),
	#[error("missing field `{0}`")]
	MissingField(&'static str),
	#[error("duplicate field `{0}`")]
	DuplicateField(&'static str),
	#[error("io error: {0}")]
	Io(#[from] io::Error),
	#[error("utf8 error: {0}")]
	Utf8(#[from] std::str::Utf8Error),
	#[error("invalid token: {0}, expected {1}")]
	InvalidToken(String, String),
	#[error("parse error: {0}")]
	Parse(String)
}

impl Error {
	pub(crate) fn invalid_token(unexp: &str, exp: &str) -> Self {
		Self::InvalidToken(unexp.to_string(), exp.to_string())
	}
	
	pub(crate) fn unexpected_eof(msg: &str) -> Self {
		Self::Io(io::Error::new(io::ErrorKind::UnexpectedEof, msg.to_string()))
	}
}

struct DisplayImpl<'a>(&'a dyn Expected);

impl fmt::Display for DisplayImpl<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

impl de::Error for Error {
	fn custom<U: fmt::Display>(msg: U) -> Self {
		Self::Custom(msg.to_string())
	}
	
	fn invalid_type(unexp: Unexpected, exp: &dyn Expected) -> Self {
		Self::InvalidType(unexp.to_string(), DisplayImpl(exp).to_string())
	}
	
	fn invalid_value(unexp: Unexpected, exp: &dyn Expected) -> Self {
		Self::InvalidValue(unexp.to_string(), DisplayImpl(exp).to_string())
	}
	
	fn invalid_length(len: usize, exp: &dyn Expected) -> Self {
		Self::InvalidLength(len, DisplayImpl(exp).to_string())
	}
	
	fn unknown_variant(variant: &str, expected: &'static [&'static str]) -> Self {
		Self::UnknownVariant(variant.to_string(), expected)
	}
	
	fn unknown_field(field: &str, expected: &'static [&'static str]) -> Self {
		Self::UnknownField(field.to_string(), expected)
	}
	
	fn missing_field(field: &'static str) -> Self {
		Self::MissingField(field)
	}
	
	fn duplicate_field(field: &'static str) -> Self {
		Self::DuplicateField(field)
	}
}

struct IgnoredIdSeed;

impl<'de> de::DeserializeSeed<'de> for IgnoredIdSeed {
	type Value = IgnoredAny;
	
	fn deserialize<D: de::Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
		deserializer.deserialize_identifier(de::IgnoredAny)
	}
}

struct NoopSeed;

impl<'de> de::DeserializeSeed<'de> for NoopSeed {
	type Value = ();
	
	fn deserialize<D: de::Deserializer<'de>>(self, _deserializer: D) -> Result<Self::Value, D::Error> {
		Ok(())
	}
}

#[derive(Debug)]
pub struct Deserializer<T: io::BufRead> {
	reader: T,
	state:  State,
	stack:  Vec<String>,
	buf:    String
}

impl<T: io::BufRead> Deserializer<T> {
	pub fn from_reader(mut reader: T) -> Self {
		// consume magic bytes for unicode text files
		if reader.fill_buf().unwrap_or(&[]).starts_with(&UNICODE_FILE_MAGIC_BYTES) {
			reader.consume(3);
		}
		
		Self {
			reader,
			state:  Uninit,
			stack:  Vec::new(),
			buf:    String::new(),
		}
	}
	
	/// The names of the currently open tags, outermost first.
	pub fn path(&self) -> String {
		self.stack.join("/")
	}
	
	fn next(&mut self) -> Result<char, Error> {
		let first = match self.reader.fill_buf()?.first().copied() {
			Some(b) => b,
			None => return Err(Error::unexpected_eof(&self.path()))
		};
		
		let len = if first & 0x80 == 0 {
			1
		} else if first & 0xE0 == 0xC0 {
			2
		} else if first & 0xF0 == 0xE0 {
			3
		} else {
			4
		};
		
		let mut buf = [0u8; 4];
		self.reader.read_exact(&mut buf[..len])?;
		std::str::from_utf8(&buf[..len])?
			.chars()
			.next()
			.ok_or_else(|| Error::unexpected_eof("truncated character"))
	}
	
	fn read_until(&mut self, mut f: impl FnMut(u8) -> bool, peek: bool) -> Result<u8, Error> {
		// a character may span two chunks of the reader, decode once the token is complete
		let mut bytes = Vec::new();
		
		loop {
			let buf = self.reader.fill_buf()?;
			
			if buf.is_empty() {
				return Err(Error::unexpected_eof(&self.stack.join("/")));
			}
			
			match buf.iter().position(|c| f(*c)) {
				Some(i) => {
					let ch = buf[i];
					bytes.extend_from_slice(&buf[..i]);
					self.reader.consume(i + if peek { 0 } else { 1 });
					self.buf.push_str(std::str::from_utf8(&bytes)?);
					return Ok(ch);
				}
				None => {
					let len = buf.len();
					bytes.extend_from_slice(buf);
					self.reader.consume(len);
				}
			}
		}
	}
	
	fn next_value<U: FromStr>(&mut self) -> Result<U, Error> {
		let raw = match self.state {
			AttrValue => {
				self.read_until(|ch| ch == b'"', false)?;
				self.state = AttrKey;
				mem::take(&mut self.buf)
			}
			BodyValue => {
				self.read_until(|ch| ch == b'<', true)?;
				self.state = BodyKey;
				mem::take(&mut self.buf)
			}
			// a primitive stored as the sole content of a tag
			TagValue(true) => Body::<String>::deserialize(&mut*self)?.value,
			state => return Err(invalid_state(state, file!(), line!()))
		};
		
		trace!(path = %self.path(), value = raw.as_str(), "xml value");
		let value = convert_xml(raw.trim());
		value.parse::<U>()
			.map_err(|_| Error::Parse(format!("failed to parse `{}` as {}", value, std::any::type_name::<U>())))
	}
}

/// Primitives are read as text and parsed with `FromStr`.
macro_rules! parsed_primitives {
	( $( $method:ident => $visit:ident ),* ) => { $(
		fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
			visitor.$visit(self.next_value()?)
		}
	)* };
}

impl<'a, 'de, T: io::BufRead> serde::Deserializer<'de> for &'a mut Deserializer<T> {
	type Error = Error;
	
	fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
		match self.state {
			// parse a tag's name
			TagKey => {
				let ch = self.read_until(|ch| ch.is_ascii_whitespace() || ch == b'>', false)?;
				self.state = TagValue(ch == b'>');
				trace!(path = %self.path(), tag = self.buf.as_str(), "xml tag");
				let r = visitor.visit_str(self.buf.as_str());
				self.stack.push(mem::take(&mut self.buf));
				r
			}
			// parse attribute name
			AttrKey => {
				self.read_until(|ch| ch.is_ascii_whitespace() || ch == b'=', false)?;
				self.state = AttrValue;
				trace!(path = %self.path(), attr = self.buf.as_str(), "xml attribute");
				let r = visitor.visit_str(self.buf.as_str());
				self.buf.clear();
				r
			}
			// return value identifier
			BodyKey => {
				self.state = BodyValue;
				visitor.visit_str("$value")
			},
			state => Err(invalid_state(state, file!(), line!()))
		}
	}
	
	fn deserialize_map<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Self::Error> {
		match self.state {
			TagValue(new_state) => {
				self.state = if new_state { BodyKey } else { AttrKey };
				visitor.visit_map(self)
			}
			// skip everything up to the root tag, then read it like any other
			Uninit => {
				self.state = BodyKey;
				match self.next_key_seed(IgnoredIdSeed)? {
					Some(_) => self.deserialize_map(visitor),
					None => Err(Error::unexpected_eof("empty document"))
				}
			}
			state => Err(invalid_state(state, file!(), line!()))
		}
	}
	
	fn deserialize_seq<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Self::Error> {
		match self.state {
			TagValue(new_state) => {
				self.state = if new_state { BodyKey } else { AttrKey };
				visitor.visit_seq(self)
			}
			// skip everything up to the root tag, then read it like any other
			Uninit => {
				self.state = BodyKey;
				match self.next_key_seed(IgnoredIdSeed)? {
					Some(_) => self.deserialize_seq(visitor),
					None => Err(Error::unexpected_eof("empty document"))
				}
			}
			state => Err(invalid_state(state, file!(), line!()))
		}
	}
	
	fn deserialize_enum<V: Visitor<'de>>(
		self,
		_name:     &'static str,
		_variants: &'static [&'static str],
		visitor:   V
	) -> Result<V::Value, Self::Error> {
		match self.state {
			AttrValue | BodyValue => visitor.visit_enum(
				self.next_value::<String>()?.into_deserializer()),
			Uninit | TagValue(_) => {
				self.deserialize_map(IgnoredAny)?;
				visitor.visit_enum(self)
			},
			state => Err(invalid_state(state, file!(), line!()))
		}
	}
	
	fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
		match self.state {
			TagKey | AttrKey | BodyKey => self.deserialize_identifier(visitor),
			Uninit | TagValue(_) => self.deserialize_map(visitor),
			AttrValue | BodyValue =>  visitor.visit_string(self.next_value()?)
		}
	}
	
	parsed_primitives! {
		deserialize_bool    => visit_bool,
		deserialize_i8      => visit_i8,
		deserialize_i16     => visit_i16,
		deserialize_i32     => visit_i32,
		deserialize_i64     => visit_i64,
		deserialize_u8      => visit_u8,
		deserialize_u16     => visit_u16,
		deserialize_u32     => visit_u32,
		deserialize_u64     => visit_u64,
		deserialize_f32     => visit_f32,
		deserialize_f64     => visit_f64,
		deserialize_char    => visit_char,
		deserialize_str     => visit_string,
		deserialize_string  => visit_string
	}
	
	fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
		visitor.visit_byte_buf(self.next_value::<String>()?.into_bytes())
	}
	
	fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
		visitor.visit_byte_buf(self.next_value::<String>()?.into_bytes())
	}
	
	fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
		visitor.visit_some(self)
	}
	
	fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
		self.next_value::<String>()?;
		visitor.visit_unit()
	}
	
	fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value, Self::Error> where
		V: Visitor<'de> {
		self.deserialize_unit(visitor)
	}
	
	fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value, Self::Error> where
		V: Visitor<'de> {
		visitor.visit_newtype_struct(self)
	}
	
	fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error> where
		V: Visitor<'de> {
		self.deserialize_seq(visitor)
	}
	
	fn deserialize_tuple_struct<V>(self, _name: &'static str, _len: usize, visitor: V) -> Result<V::Value, Self::Error> where
		V: Visitor<'de> {
		self.deserialize_seq(visitor)
	}
	
	fn deserialize_struct<V>(self, _name: &'static str, _fields: &'static [&'static str], visitor: V) -> Result<V::Value, Self::Error> where
		V: Visitor<'de> {
		self.deserialize_map(visitor)
	}
	
	fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
		self.deserialize_any(visitor)
	}
	
	fn is_human_readable(&self) -> bool {
		true
	}
}

impl<'a, 'de, R: io::BufRead> de::MapAccess<'de> for &'a mut Deserializer<R> {
	type Error = Error;
	
	fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error> {
		let ch = 'outer: loop {
			match self.state {
				AttrKey => loop {
					match self.next()? {
						ch if ch.is_whitespace() => (),
						'>' => {
							self.state = BodyKey;
							break;
						}
						'/' => return match self.next()? {
							'>' => {
								self.state = BodyKey;
								self.stack.pop();
								Ok(None)
							}
							ch => Err(Error::invalid_token(&format!("'{}'", ch), "'>'"))
						},
						ch => break 'outer ch
					}
				}
				BodyKey => {
					loop {
						match self.next()? {
							ch if ch.is_whitespace() => (),
							'<' => break,
							ch => break 'outer ch
						}
					}
					
					match self.next()? {
						// closing tag
						'/' => loop {
							match self.next()? {
								ch if ch.is_whitespace() => (),
								'>' => return match self.stack.pop() {
									Some(tag) if tag == self.buf => {
										self.buf.clear();
										Ok(None)
									},
									tag => Err(Error::Custom(format!(
										"invalid closing tag: `{}`, expected `{:?}`",
										mem::take(&mut self.buf), tag
									)))
								},
								ch => self.buf.push(ch)
							}
						}
						// comment/doctype, skip
						'!' => loop {
							while self.next()? != '-' {}
							if self.next()? == '-' && self.next()? == '>' { break; }
						}
						// processing instruction, skip
						'?' => loop {
							while self.next()? != '?' {}
							if self.next()? == '>' { break; }
						}
						// opening tag
						ch => {
							self.state = TagKey;
							break 'outer ch;
						}
					}
				}
				state => return Err(invalid_state(state, file!(), line!()))
			}
		};
		
		self.buf.push(ch);
		seed.deserialize(&mut**self).map(Some)
	}
	
	fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Self::Error>{
		match self.state {
			TagValue(_) | BodyValue => (),
			AttrValue => loop {
				match self.next()? {
					'"' => break,
					ch if ch.is_whitespace() || ch == '=' => (),
					ch => return Err(Error::invalid_token(&format!("'{}'", ch),  "'\"', '=' or whitespace"))
				}
			}
			state => return Err(invalid_state(state, file!(), line!()))
		}
		
		seed.deserialize(&mut**self)
	}
}

impl<'a, 'de, R: io::BufRead> de::EnumAccess<'de> for &'a mut Deserializer<R> {
	type Error   = Error;
	type Variant = Self;
	
	fn variant_seed<V: DeserializeSeed<'de>>(mut self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error> {
		match self.next_entry_seed(seed, NoopSeed)? {
			Some((k, _)) => Ok((k, self)),
			None => Err(Error::Custom(format!("no variant found in `{}`", self.path())))
		}
	}
}

impl<'a, 'de, R: io::BufRead> de::VariantAccess<'de> for &'a mut Deserializer<R> {
	type Error = Error;
	
	fn unit_variant(self) -> Result<(), Self::Error> {
		use de::Deserializer;
		self.deserialize_ignored_any(IgnoredAny).map(|_| ())
	}
	
	fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, Self::Error> {
		seed.deserialize(self)
	}
	
	fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error> {
		use de::Deserializer;
		self.deserialize_tuple(len, visitor)
	}
	
	fn struct_variant<V: Visitor<'de>>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value, Self::Error> {
		use de::Deserializer;
		self.deserialize_map(visitor)
	}
}

impl<'a, 'de, R: io::BufRead> de::SeqAccess<'de> for &'a mut Deserializer<R> {
	type Error = Error;
	
	fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error> {
		struct Visitor;
		
		impl<'de> de::Visitor<'de> for Visitor {
			type Value = String;
			
			fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
				write!(formatter, "an identifier")
			}
			
			fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
				Ok(v.to_string())
			}
		}
		
		struct Seed;
		
		impl<'de> de::DeserializeSeed<'de> for Seed {
			type Value = String;
			
			fn deserialize<D: de::Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
				deserializer.deserialize_identifier(Visitor)
			}
		}
		
		match self.next_key_seed(Seed)? {
			Some(id) => seed.deserialize(&mut SeqDeserializer {
				inner: Some(&mut**self),
				id:    Some(id)
			}).map(Some),
			None => Ok(None)
		}
	}
}

/// Presents a single sequence element as an enum tagged with its tag or attribute name.
struct SeqDeserializer<'a, R: io::BufRead> {
	inner: Option<&'a mut Deserializer<R>>,
	id:    Option<String>,
}

impl<'a, R: io::BufRead> SeqDeserializer<'a, R> {
	fn take_inner(&mut self) -> Result<&'a mut Deserializer<R>, Error> {
		self.inner.take().ok_or_else(|| Error::Custom("sequence element was already consumed".to_string()))
	}
}

impl<'a, 'b, 'de, R: io::BufRead> de::Deserializer<'de> for &'b mut SeqDeserializer<'a, R> {
	type Error = Error;
	
	fn deserialize_any<V>(self, visitor: V) -> Result<<V as Visitor<'de>>::Value, Self::Error> where
		V: Visitor<'de> {
		match self.id {
			Some(_) => visitor.visit_map(self),
			None => Err(Error::Custom("sequence element has no identifier".to_string()))
		}
	}
	
	fn deserialize_enum<V: Visitor<'de>>(
		self,
		_name:     &'static str,
		_variants: &'static [&'static str],
		visitor:   V
	) -> Result<V::Value, Self::Error> {
		visitor.visit_enum(self)
	}
	
	fn deserialize_identifier<V>(self, visitor: V) -> Result<<V as Visitor<'de>>::Value, Self::Error> where
		V: Visitor<'de> {
		match self.id.take() {
			Some(id) => visitor.visit_string(id),
			None => Err(Error::Custom("sequence element has no identifier".to_string()))
		}
	}
	
	forward_to_deserialize_any!(
		bool i8 i16 i32 i64 u8 u16 u32 u64 f32 f64 char str string bytes byte_buf option unit
		unit_struct newtype_struct seq tuple tuple_struct map struct ignored_any
	);
}

impl<'a, 'de, R: io::BufRead> de::MapAccess<'de> for SeqDeserializer<'a, R> {
	type Error = Error;
	
	fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error> {
		match self.inner {
			Some(_) => seed.deserialize(&mut *self).map(Some),
			None => Ok(None)
		}
	}
	
	fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Self::Error> {
		let mut inner = self.take_inner()?;
		inner.next_value_seed(seed)
	}
}

impl<'a, 'b, 'de, R: io::BufRead> de::EnumAccess<'de> for &'b mut SeqDeserializer<'a, R> {
	type Error   = Error;
	type Variant = &'a mut Deserializer<R>;
	
	fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error> {
		let mut inner = self.take_inner()?;
		let v = seed.deserialize(self)?;
		inner.next_value_seed(NoopSeed)?;
		Ok((v, inner))
	}
}

/// converts xml entities (e.g.: &quot; -> ")
fn convert_xml(mut s: &str) -> String {
	let mut buf = String::with_capacity(s.len());
	
	while let Some(off) = s.find('&') {
		buf.push_str(&s[..off]);
		s = &s[off..];
		
		let end = match s.find(';') {
			Some(end) => end,
			None => break
		};
		
		let ch = match &s[1..end] {
			"exclamation" => Some('!'),
			"quot"        => Some('"'),
			"percent"     => Some('%'),
			"amp"         => Some('&'),
			"apos"        => Some('\''),
			"add"         => Some('+'),
			"lt"          => Some('<'),
			"equal"       => Some('='),
			"gt"          => Some('>'),
			e if e.starts_with("#x") => u32::from_str_radix(&e[2..], 16).ok().and_then(char::from_u32),
			e if e.starts_with('#') => e[1..].parse::<u32>().ok().and_then(char::from_u32),
			_             => None
		};
		
		match ch {
			Some(ch) => buf.push(ch),
			// unknown entities are kept verbatim
			None => buf.push_str(&s[..=end])
		}
		
		s = &s[end + 1..];
	}
	
	buf.push_str(s);
	buf
}

#[cfg(test)]
mod tests {
	use {super::*, pretty_assertions::assert_eq};
	
	#[derive(Debug, PartialEq, Deserialize)]
	#[serde(rename_all = "lowercase")]
	enum Node {
		Name(Body<String>),
		Item(Item),
		#[serde(other)]
		Other
	}
	
	#[derive(Debug, PartialEq, Deserialize)]
	struct Item {
		name:  String,
		count: u32
	}
	
	#[test]
	fn skips_prolog_and_comments() {
		let doc = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- a - comment -->\n<root><name>first</name>\n<name>second</name></root>";
		let nodes: Vec<Node> = deserialize(doc.as_bytes()).unwrap();
		assert_eq!(nodes, vec![
			Node::Name(Body { value: "first".to_string() }),
			Node::Name(Body { value: "second".to_string() })
		]);
	}
	
	#[test]
	fn reads_attributes_of_self_closing_tags() {
		let doc = r#"<root><item name="x" count="3"/><unknown a="b"/></root>"#;
		let nodes: Vec<Node> = deserialize(doc.as_bytes()).unwrap();
		assert_eq!(nodes, vec![
			Node::Item(Item { name: "x".to_string(), count: 3 }),
			Node::Other
		]);
	}
	
	#[test]
	fn converts_entities() {
		assert_eq!(convert_xml("a &amp; b &lt;&gt; &quot;c&quot;"), "a & b <> \"c\"");
		assert_eq!(convert_xml("&#65;&#x42;"), "AB");
		assert_eq!(convert_xml("&unknown; & more"), "&unknown; & more");
	}
	
	#[test]
	fn rejects_mismatched_closing_tag() {
		let doc = "<root><name>x</nope></root>";
		assert!(deserialize::<Vec<Node>, _>(doc.as_bytes()).is_err());
	}
	
	#[test]
	fn reads_characters_split_across_reader_chunks() {
		// `BufReader` refills every 8 KiB, put the two bytes of `é` on both sides of the boundary
		let prefix = "<root><name>";
		let padding = "a".repeat(8191 - prefix.len());
		let doc = format!("{}{}é</name></root>", prefix, padding);
		assert_eq!(doc.as_bytes()[8191..8193], "é".as_bytes()[..]);
		
		let nodes: Vec<Node> = deserialize(io::BufReader::new(doc.as_bytes())).unwrap();
		assert_eq!(nodes, vec![Node::Name(Body { value: format!("{}é", padding) })]);
	}
	
	#[test]
	fn strips_byte_order_mark() {
		let mut doc = UNICODE_FILE_MAGIC_BYTES.to_vec();
		doc.extend_from_slice(b"<root><name>x</name></root>");
		let nodes: Vec<Node> = deserialize(doc.as_slice()).unwrap();
		assert_eq!(nodes, vec![Node::Name(Body { value: "x".to_string() })]);
	}
}
