use std::{collections::VecDeque, error::Error, fs, path::{Path, PathBuf}, sync::{atomic::{self, AtomicUsize}, Arc, RwLock}, thread};
use image::ExtendedColorType;
use log::{error, info, warn};
use p2file::{Asset, AssetKind, ExtractOptions, extract};
use crate::config::Config;

#[derive(Debug, Default)]
pub struct Summary {
	pub processed: usize,
	pub failed: usize,
	pub written: usize
}

fn natural_cmp(x: &Path, y: &Path) -> std::cmp::Ordering {
	lexical_sort::natural_lexical_cmp(&x.to_string_lossy().to_ascii_lowercase(), &y.to_string_lossy().to_ascii_lowercase())
}

/// Files are taken as given, directories contribute the files directly inside them.
pub fn survey(inputs: &[PathBuf]) -> VecDeque<PathBuf> {
	let mut files = VecDeque::new();
	for input in inputs {
		if !input.is_dir() {
			files.push_back(input.clone());
			continue;
		}
		match input.read_dir() {
			Ok(entries) => {
				let mut found: Vec<_> = entries
					.filter_map(|entry| entry.ok())
					.filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
					.map(|entry| entry.path())
					.collect();
				found.sort_by(|x, y| natural_cmp(x, y));
				files.extend(found);
			}
			Err(e) => warn!("cannot read directory '{}': {e}", input.display())
		}
	}
	files
}

/// Output names come from archive entries and may carry path separators.
fn file_name_for(name: &str) -> String {
	name.chars().map(|c| match c {
		'/' | '\\' | ':' => '_',
		c if c.is_control() => '_',
		c => c
	}).collect()
}

fn write_asset(out_dir: &Path, asset: &Asset, convert_images: bool) -> Result<bool, Box<dyn Error + Send + Sync>> {
	let target = out_dir.join(file_name_for(&asset.name));
	match &asset.kind {
		AssetKind::Binary(data) => fs::write(&target, data)?,
		AssetKind::Text(text) => fs::write(&target, text)?,
		AssetKind::Sound(sound) => fs::write(&target, sound.to_wav())?,
		AssetKind::Image(frame) => {
			if !convert_images {
				return Ok(false);
			}
			image::save_buffer(&target, frame.as_rgba_bytes(), frame.width, frame.height, ExtendedColorType::Rgba8)?;
		}
	}
	Ok(true)
}

fn process(path: &Path, config: &Config) -> Result<usize, Box<dyn Error + Send + Sync>> {
	let buf = fs::read(path)?;
	let prefix = path.file_name().map_or_else(|| path.to_string_lossy(), |name| name.to_string_lossy()).into_owned();
	let options = ExtractOptions {raw_chunks: config.write_raw_chunks, ..Default::default()};
	let extraction = extract(&buf, &prefix, &options)?;
	if !extraction.claimed {
		warn!("'{}' is not a recognised format, nothing written", path.display());
	}
	fs::create_dir_all(&config.out_dir)?;
	let mut written = 0;
	for asset in &extraction.outputs {
		if write_asset(&config.out_dir, asset, config.convert_images)? {
			written += 1;
		}
	}
	Ok(written)
}

/// Runs every file through the extractor on a pool of worker threads.
/// A failing file is reported and counted, the others carry on.
pub fn run(files: VecDeque<PathBuf>, config: &Config) -> Summary {
	let found = files.len();
	let pending_files = Arc::new(RwLock::new(files));
	let processed_file_count = Arc::new(AtomicUsize::new(0));
	let failed_file_count = Arc::new(AtomicUsize::new(0));
	let written_file_count = Arc::new(AtomicUsize::new(0));
	let config = Arc::new(config.clone());
	let threads: Vec<_> = (0..config.threads.clamp(1, found.max(1))).map(|_| {
		let pending_files = pending_files.clone();
		let processed_file_count = processed_file_count.clone();
		let failed_file_count = failed_file_count.clone();
		let written_file_count = written_file_count.clone();
		let config = config.clone();
		thread::spawn(move || {
			while let Some(path) = {pending_files.write().ok().and_then(|mut files| files.pop_front())} {
				match process(&path, &config) {
					Ok(written) => {
						info!("'{}': wrote {written} files", path.display());
						written_file_count.fetch_add(written, atomic::Ordering::SeqCst);
					}
					Err(e) => {
						error!("'{}': {e}", path.display());
						failed_file_count.fetch_add(1, atomic::Ordering::SeqCst);
					}
				}
				let processed = processed_file_count.fetch_add(1, atomic::Ordering::SeqCst) + 1;
				info!("processed {processed}/{found}");
			}
		})
	}).collect();
	for thread in threads {
		if thread.join().is_err() {
			error!("worker thread panicked");
			failed_file_count.fetch_add(1, atomic::Ordering::SeqCst);
		}
	}
	Summary {
		processed: processed_file_count.load(atomic::Ordering::Acquire),
		failed: failed_file_count.load(atomic::Ordering::Acquire),
		written: written_file_count.load(atomic::Ordering::Acquire)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn output_names_stay_in_the_output_directory() {
		assert_eq!(file_name_for("SPEECH.BIG-data/W15_5A.fat-snd0.wav"), "SPEECH.BIG-data_W15_5A.fat-snd0.wav");
		assert_eq!(file_name_for("a\\b:c\n"), "a_b_c_");
	}

	#[test]
	fn directories_are_listed_in_natural_order() {
		let dir = std::env::temp_dir().join(format!("p2file-dump-survey-{}", std::process::id()));
		fs::create_dir_all(dir.join("sub")).unwrap();
		for name in ["MISSION10.IFF", "mission2.iff", "MISSION1.IFF"] {
			fs::write(dir.join(name), b"").unwrap();
		}
		let files = survey(&[dir.clone(), PathBuf::from("loose.big")]);
		let names: Vec<_> = files.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();
		fs::remove_dir_all(&dir).unwrap();
		assert_eq!(names, ["MISSION1.IFF", "mission2.iff", "MISSION10.IFF", "loose.big"]);
	}

	#[test]
	fn failures_are_counted_per_file() {
		let dir = std::env::temp_dir().join(format!("p2file-dump-run-{}", std::process::id()));
		fs::create_dir_all(&dir).unwrap();
		let bad = dir.join("BAD.IFF");
		fs::write(&bad, b"FORM\0\0\0\x0cTESTNULL\0\0\0\0").unwrap();
		let good = dir.join("GOOD.IFF");
		fs::write(&good, b"FORM\0\0\0\x0eTESTDATA\0\0\0\x02ok").unwrap();
		let config = Config {out_dir: dir.join("out"), write_raw_chunks: false, convert_images: false, threads: 2};
		let summary = run([bad, good, dir.join("MISSING")].into(), &config);
		let written = fs::read(dir.join("out").join("GOOD.IFF-chunk-0x00000014-TEST-DATA.bin"));
		fs::remove_dir_all(&dir).unwrap();
		assert_eq!(summary.processed, 3);
		assert_eq!(summary.failed, 2);
		assert_eq!(summary.written, 1);
		assert_eq!(written.unwrap(), b"ok");
	}
}
