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

use {
	super::*,
	std::collections::HashSet,
	tracing::{trace, warn}
};

/// `enum class` projections of every value enum.
pub struct EnumTemplate;

impl Template for EnumTemplate {
	fn name(&self) -> &'static str {
		"enums"
	}
	
	fn expand(&self, ctx: &Context, writer: &mut dyn io::Write) -> Result<(), Error> {
		for e in ctx.registry.enums.iter().filter(|e| e.kind == EnumKind::Enum) {
			trace!(name = e.name.as_str(), "emitting enum");
			let name = ctx.projector.type_name(&e.name);
			
			write_protect_begin(writer, e.protect.as_deref())?;
			writeln!(writer)?;
			match e.comment.as_deref() {
				Some(comment) => write_comment(writer, Some(comment))?,
				None => writeln!(writer, "//! Enum class version of {}", e.name)?
			}
			writeln!(writer, "enum class {} : int32_t {{", name)?;
			
			let mut seen = HashSet::new();
			for v in &e.values {
				let enumerator = ctx.projector.enum_value(&e.name, &v.name);
				if enumerator.is_empty() || !seen.insert(enumerator.clone()) {
					warn!(value = v.name.as_str(), "skipping enumerator with a duplicate projected name");
					continue;
				}
				
				write_comment_pre(writer, "\t//!", v.comment.as_deref())?;
				writeln!(writer, "\t{} = {},", enumerator, v.name)?;
			}
			
			writeln!(writer, "}};")?;
			writeln!(writer, "static_assert(sizeof({}) == sizeof({}), \"enum and wrapper have different size!\");", name, e.name)?;
			write_protect_end(writer, e.protect.as_deref())?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use {super::*, crate::test_data::{registry, platform_registry}};
	
	#[test]
	fn emits_enum_classes() {
		let out = expand_to_string(&EnumTemplate, &registry());
		
		assert!(out.contains("\
enum class ReferenceSpaceType : int32_t {
	View = XR_REFERENCE_SPACE_TYPE_VIEW,
	Local = XR_REFERENCE_SPACE_TYPE_LOCAL,
	Stage = XR_REFERENCE_SPACE_TYPE_STAGE,
	UnboundedMSFT = XR_REFERENCE_SPACE_TYPE_UNBOUNDED_MSFT,
};
static_assert(sizeof(ReferenceSpaceType) == sizeof(XrReferenceSpaceType), \"enum and wrapper have different size!\");
"));
		assert!(out.contains("\tInstanceCreateInfo = XR_TYPE_INSTANCE_CREATE_INFO,\n"));
		assert!(out.contains("\tGraphicsBindingOpenGLWin32KHR = XR_TYPE_GRAPHICS_BINDING_OPENGL_WIN32_KHR,\n"));
		assert!(out.contains("\t//! The function usage was invalid in some way.\n\tErrorValidationFailure = XR_ERROR_VALIDATION_FAILURE,\n"));
		assert!(out.contains("//! Error and return codes\nenum class Result : int32_t {"));
	}
	
	#[test]
	fn guards_platform_enums() {
		let out = expand_to_string(&EnumTemplate, &platform_registry());
		
		assert_eq!(out, "\
#if defined(XR_USE_PLATFORM_ANDROID)

//! Enum class version of XrAndroidThreadTypeKHR
enum class AndroidThreadTypeKHR : int32_t {
	ApplicationMain = XR_ANDROID_THREAD_TYPE_APPLICATION_MAIN_KHR,
	RendererWorker = XR_ANDROID_THREAD_TYPE_RENDERER_WORKER_KHR,
};
static_assert(sizeof(AndroidThreadTypeKHR) == sizeof(XrAndroidThreadTypeKHR), \"enum and wrapper have different size!\");
#endif  // XR_USE_PLATFORM_ANDROID
");
	}
	
	#[test]
	fn skips_bitmasks_and_constants() {
		let out = expand_to_string(&EnumTemplate, &registry());
		
		assert!(!out.contains("CompositionLayerFlagBits"));
		assert!(!out.contains("XR_MAX_APPLICATION_NAME_SIZE"));
		assert_eq!(out.matches("enum class").count(), 3);
	}
	
	#[test]
	fn skips_duplicate_enumerators() {
		let mut registry = registry();
		let space = registry.enums.iter_mut().find(|e| e.name == "XrReferenceSpaceType").unwrap();
		space.values.push(EnumValue { name: "XR_REFERENCE_SPACE_TYPE_STAGE_".into(), alias: None, comment: None });
		
		let out = expand_to_string(&EnumTemplate, &registry);
		assert_eq!(out.matches("\tStage = ").count(), 1);
		assert!(!out.contains("XR_REFERENCE_SPACE_TYPE_STAGE_,"));
	}
}
