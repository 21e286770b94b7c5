pub mod dirs {
    use std::env;
    use std::path::PathBuf;

    pub fn base_dir() -> PathBuf {
        env::current_exe()
            .expect("Can't get current executable path")
            .parent()
            .expect("Can't get parent directory of executable")
            .to_owned()
    }
    pub fn data_dir() -> PathBuf {
        base_dir().join("data")
    }
    /// Default root for server directories, one subdirectory per server
    pub fn servers_dir() -> PathBuf {
        data_dir().join("servers")
    }

}
