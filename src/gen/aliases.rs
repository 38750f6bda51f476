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

use {super::*, tracing::trace};

/// `using` declarations for handles, flags and base types.
pub struct AliasTemplate;

impl Template for AliasTemplate {
	fn name(&self) -> &'static str {
		"aliases"
	}
	
	fn expand(&self, ctx: &Context, writer: &mut dyn io::Write) -> Result<(), Error> {
		let values = emitted_value_types(ctx.registry)
			.map(|v| v.raw)
			.collect::<Vec<_>>();
		
		writeln!(writer)?;
		for a in &ctx.registry.aliases {
			if a.kind == AliasKind::Struct || values.iter().any(|v| *v == a.name) {
				continue;
			}
			
			let name = ctx.projector.type_name(&a.name);
			if name == a.name {
				continue;
			}
			
			trace!(name = a.name.as_str(), kind = ?a.kind, "emitting alias");
			write_protect_begin(writer, a.protect.as_deref())?;
			writeln!(writer, "using {} = {};", name, a.name)?;
			write_protect_end(writer, a.protect.as_deref())?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use {super::*, crate::test_data::registry, pretty_assertions::assert_eq};
	
	#[test]
	fn emits_using_declarations() {
		let out = expand_to_string(&AliasTemplate, &registry());
		
		assert_eq!(out, "
using Bool32 = XrBool32;
using Flags64 = XrFlags64;
using Path = XrPath;
using Instance = XrInstance;
using Space = XrSpace;
using CompositionLayerFlags = XrCompositionLayerFlags;
");
	}
	
	#[test]
	fn keeps_raw_aliases_without_value_types() {
		let mut registry = registry();
		registry.aliases.retain(|a| a.name != "XrDuration");
		
		// `Time` needs `Duration`, so both fall back to plain aliases
		let out = expand_to_string(&AliasTemplate, &registry);
		assert!(out.contains("using Time = XrTime;\n"));
	}
	
	#[test]
	fn guards_protected_aliases() {
		let mut registry = registry();
		registry.aliases.push(AliasDescriptor {
			kind:    AliasKind::Handle,
			name:    "XrSpatialAnchorMSFT".into(),
			target:  None,
			protect: Some("XR_USE_PLATFORM_WIN32".into())
		});
		
		let out = expand_to_string(&AliasTemplate, &registry);
		assert!(out.ends_with("#if defined(XR_USE_PLATFORM_WIN32)\nusing SpatialAnchorMSFT = XrSpatialAnchorMSFT;\n#endif  // XR_USE_PLATFORM_WIN32\n"));
	}
}
