use crate::error::Error;
use crate::error::LastError;
use std::path::PathBuf;

/// The filesystem context for one simulation session of an entity.
///
/// All paths are derived from the entity's root directory:
/// - sources under `<root>/vhdl`
/// - exchange files under `<root>/Simulations/vhdlsim`
/// - the compiled work library under `<root>/Simulations/vhdlsim/work`
#[derive(Debug, PartialEq, Clone)]
pub struct Session {
    name: String,
    entity_path: PathBuf,
    src_path: PathBuf,
    sim_path: PathBuf,
    work_path: PathBuf,
}

impl Session {
    pub fn new(entity_path: PathBuf, name: &str) -> Result<Self, Error> {
        if name.is_empty() == true {
            return Err(Error::EmptyEntityName);
        }
        if entity_path.exists() == false {
            return Err(Error::EntityRootMissing(entity_path));
        }
        let src_path = entity_path.join("vhdl");
        let sim_path = entity_path.join("Simulations").join("vhdlsim");
        let work_path = sim_path.join("work");
        Ok(Self {
            name: name.to_string(),
            entity_path,
            src_path,
            sim_path,
            work_path,
        })
    }

    /// Creates the simulation directories if they do not yet exist.
    pub fn bootstrap(self) -> Result<Self, Error> {
        match std::fs::create_dir_all(&self.sim_path) {
            Ok(()) => Ok(self),
            Err(e) => Err(Error::SimDirNotCreated(LastError(e.to_string()))),
        }
    }

    /// References the entity's name (also the name of its source file stem).
    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_entity_path(&self) -> &PathBuf {
        &self.entity_path
    }

    pub fn get_src_path(&self) -> &PathBuf {
        &self.src_path
    }

    pub fn get_sim_path(&self) -> &PathBuf {
        &self.sim_path
    }

    pub fn get_work_path(&self) -> &PathBuf {
        &self.work_path
    }

    /// The entity's source file: `<root>/vhdl/<name>.vhd`.
    pub fn get_source_file(&self) -> PathBuf {
        self.src_path.join(format!("{}.vhd", self.name))
    }

    /// The testbench source file: `<root>/vhdl/tb_<name>.vhd`.
    pub fn get_bench_file(&self) -> PathBuf {
        self.src_path.join(format!("tb_{}.vhd", self.name))
    }

    /// The simulated design unit, by convention `work.tb_<name>`.
    pub fn get_bench_unit(&self) -> String {
        format!("work.tb_{}", self.name)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn ut_derive_layout() {
        let dir = tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let session = Session::new(root.clone(), "inv_filter").unwrap();
        assert_eq!(session.get_src_path(), &root.join("vhdl"));
        assert_eq!(
            session.get_sim_path(),
            &root.join("Simulations").join("vhdlsim")
        );
        assert_eq!(
            session.get_work_path(),
            &root.join("Simulations").join("vhdlsim").join("work")
        );
        assert_eq!(
            session.get_source_file(),
            root.join("vhdl").join("inv_filter.vhd")
        );
        assert_eq!(
            session.get_bench_file(),
            root.join("vhdl").join("tb_inv_filter.vhd")
        );
        assert_eq!(session.get_bench_unit(), "work.tb_inv_filter");
    }

    #[test]
    fn ut_bootstrap_creates_sim_dirs() {
        let dir = tempdir().unwrap();
        let session = Session::new(dir.path().to_path_buf(), "dut")
            .unwrap()
            .bootstrap()
            .unwrap();
        assert_eq!(session.get_sim_path().is_dir(), true);
        // calling again on an existing tree is fine
        let _ = session.bootstrap().unwrap();
    }

    #[test]
    fn ut_reject_bad_config() {
        let dir = tempdir().unwrap();
        assert_eq!(
            Session::new(dir.path().to_path_buf(), ""),
            Err(Error::EmptyEntityName)
        );
        let missing = dir.path().join("no_such_entity");
        assert_eq!(
            Session::new(missing.clone(), "dut"),
            Err(Error::EntityRootMissing(missing))
        );
    }
}
