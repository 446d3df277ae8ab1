use std::path::PathBuf;

pub const PARAMS_FILE_REL: &str = "./.glidetype/gesture_params.yaml";

pub fn get_absolute_path(path_in_home_dir: &str) -> Option<PathBuf> {
    match home::home_dir() {
        Some(path) => {
            let mut new_path = path;
            new_path.push(path_in_home_dir);
            Some(new_path)
        }
        None => None,
    }
}
