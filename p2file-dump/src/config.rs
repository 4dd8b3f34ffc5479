use std::{collections::HashMap, fs::File, io::BufReader, path::PathBuf, sync::LazyLock};
use log::{debug, warn};
use serde_json::Value;

static CONFIG_FILE_PATH: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
	let dirs = directories::ProjectDirs::from("", "", env!("CARGO_PKG_NAME"))?;
	Some(dirs.config_local_dir().join("config.json"))
});

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
	pub out_dir: PathBuf,
	pub write_raw_chunks: bool,
	pub convert_images: bool,
	pub threads: usize
}

impl Default for Config {
	fn default() -> Self {
		Self {
			out_dir: PathBuf::from("."),
			write_raw_chunks: false,
			convert_images: true,
			threads: num_cpus::get()
		}
	}
}

impl Config {
	/// Defaults overlaid with whatever the config file has; a missing or broken file is not fatal.
	pub fn load() -> Self {
		let mut config = Self::default();
		let Some(path) = CONFIG_FILE_PATH.as_ref() else {
			return config;
		};
		let Ok(config_file) = File::open(path) else {
			debug!("no config at {}", path.display());
			return config;
		};
		match serde_json::from_reader::<_, HashMap<String, Value>>(BufReader::new(config_file)) {
			Ok(values) => config.apply(&values),
			Err(e) => warn!("ignoring config {}: {e}", path.display())
		}
		config
	}

	fn apply(&mut self, values: &HashMap<String, Value>) {
		if let Some(Value::String(value)) = values.get("out_dir") {
			self.out_dir = PathBuf::from(value);
		}

		if let Some(Value::Bool(value)) = values.get("write_raw_chunks") {
			self.write_raw_chunks = *value;
		}

		if let Some(Value::Bool(value)) = values.get("convert_images") {
			self.convert_images = *value;
		}

		if let Some(value) = values.get("threads").and_then(Value::as_u64) {
			self.threads = (value as usize).max(1);
		}
	}
}
