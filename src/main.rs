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
	xrhpp::{xml, Config, Registry},
	clap::Parser,
	std::{io, fs::{self, File}, path::PathBuf},
	tracing::info,
	tracing_subscriber::EnvFilter
};

/// Generates a typed C++ wrapper header from the OpenXR registry
#[derive(Parser, Debug)]
#[command(name = "xrhpp", author, version, about, long_about = None)]
struct Cli {
	/// The registry (`xr.xml`), read from stdin if omitted
	input: Option<PathBuf>,
	
	/// The generated header, defaults to `openxr.hpp` next to the input
	#[arg(short, long)]
	out: Option<PathBuf>,
	
	/// Fallback value of the `OPENXR_HPP_NAMESPACE` macro
	#[arg(long)]
	namespace: Option<String>,
	
	/// Include guard of the generated header
	#[arg(long)]
	guard: Option<String>,
	
	/// Enable verbose output
	#[arg(short, long)]
	verbose: bool
}

impl Cli {
	fn config(&self) -> Config {
		let default = Config::default();
		Config {
			namespace:     self.namespace.clone().unwrap_or(default.namespace),
			include_guard: self.guard.clone().unwrap_or(default.include_guard)
		}
	}
	
	fn out_path(&self) -> PathBuf {
		const DEFAULT: &str = "openxr.hpp";
		
		match (&self.out, &self.input) {
			(Some(out), _) => out.clone(),
			(None, Some(input)) => input.with_file_name(DEFAULT),
			(None, None) => PathBuf::from(DEFAULT)
		}
	}
}

fn main() {
	let cli = Cli::parse();
	
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| if cli.verbose {
		EnvFilter::new("xrhpp=debug")
	} else {
		EnvFilter::new("xrhpp=info")
	});
	
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(io::stderr)
		.with_target(false)
		.without_time()
		.init();
	
	if let Err(e) = run(&cli) {
		eprintln!("\x1b[31merror\x1b[0m: {}", e);
		std::process::exit(100);
	}
}

fn run(cli: &Cli) -> Result<(), xrhpp::Error> {
	let registry: Registry = match &cli.input {
		Some(input) => {
			info!("parsing `{}`", input.display());
			xml::deserialize(io::BufReader::new(File::open(input)?))?
		}
		None => {
			info!("parsing from stdin");
			xml::deserialize(io::stdin().lock())?
		}
	};
	
	let out = cli.out_path();
	info!("generating `{}`", out.display());
	
	// the output is only touched once the whole header was generated
	let mut header = Vec::<u8>::new();
	xrhpp::gen(&mut header, &registry, &cli.config())?;
	fs::write(&out, header)?;
	
	info!("done");
	Ok(())
}
