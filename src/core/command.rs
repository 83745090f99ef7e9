use crate::core::exchange::Registry;
use crate::core::profile::Profile;
use crate::core::session::Session;

/// How the simulator invocation behaves once launched.
///
/// `Batch` runs to completion and exits on its own; `Interactive` leaves the
/// simulator GUI/console open for manual inspection and never auto-quits.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Mode {
    Batch,
    Interactive,
}

/// Named elaboration-time parameters handed to the testbench, rendered as
/// `-g key=value` in the order given.
pub type Generics = Vec<(String, String)>;

/// Assembles the composite shell line that sets up the work library,
/// compiles the entity and its testbench, and invokes the simulator.
///
/// This is a pure function of its inputs: identical arguments produce a
/// byte-identical string.
pub fn build_command(
    session: &Session,
    profile: &Profile,
    module_files: &[String],
    generics: &Generics,
    registry: &Registry,
    mode: Mode,
    submission: Option<&str>,
) -> String {
    let work = session.get_work_path().display().to_string();

    // the sleep gives slow network filesystems time to expose the fresh library
    let lib_cmd = format!("{} {} && sleep 2", profile.get_library_tool(), work);
    let map_cmd = format!("{} work {}", profile.get_mapping_tool(), work);

    let mut sources = vec![
        session.get_source_file().display().to_string(),
        session.get_bench_file().display().to_string(),
    ];
    for module in module_files {
        sources.push(session.get_src_path().join(module).display().to_string());
    }
    let comp_cmd = format!(
        "{} -work work {}",
        profile.get_compile_tool(),
        sources.join(" ")
    );

    let file_params: Vec<String> = registry
        .iter()
        .map(|desc| desc.get_sim_param().to_string())
        .collect();
    let generic_params: Vec<String> = generics
        .iter()
        .map(|(key, value)| format!("-g {}={}", key, value))
        .collect();

    let mut sim_parts: Vec<String> = Vec::new();
    match mode {
        Mode::Batch => {
            // the submission wrapper only applies to unattended runs
            if let Some(prefix) = submission {
                sim_parts.push(prefix.trim().to_string());
            }
            sim_parts.push(profile.get_simulate_tool().to_string());
            sim_parts.push(String::from("-64 -batch"));
            sim_parts.push(format!("-t {}", profile.get_resolution()));
            sim_parts.push(String::from("-voptargs=+acc"));
            sim_parts.extend(file_params);
            sim_parts.extend(generic_params);
            sim_parts.push(session.get_bench_unit());
            sim_parts.push(String::from("-do \"run -all; quit;\""));
        }
        Mode::Interactive => {
            sim_parts.push(profile.get_simulate_tool().to_string());
            sim_parts.push(String::from("-64"));
            sim_parts.push(format!("-t {}", profile.get_resolution()));
            sim_parts.push(String::from("-novopt"));
            sim_parts.extend(file_params);
            sim_parts.extend(generic_params);
            sim_parts.push(session.get_bench_unit());
        }
    }
    let sim_cmd = sim_parts
        .into_iter()
        .filter(|p| p.is_empty() == false)
        .collect::<Vec<String>>()
        .join(" ");

    format!("{} && {} && {} && {}", lib_cmd, map_cmd, comp_cmd, sim_cmd)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::exchange::{Direction, Kind};
    use tempfile::tempdir;

    fn fixture() -> (tempfile::TempDir, Session, Profile) {
        let dir = tempdir().unwrap();
        let session = Session::new(dir.path().to_path_buf(), "mixer")
            .unwrap()
            .bootstrap()
            .unwrap();
        (dir, session, Profile::default())
    }

    #[test]
    fn ut_batch_command_shape() {
        let (_dir, session, profile) = fixture();
        let registry = Registry::new(&session);
        let cmd = build_command(&session, &profile, &[], &Vec::new(), &registry, Mode::Batch, None);
        let src = session.get_src_path().display().to_string();
        let work = session.get_work_path().display().to_string();
        assert_eq!(
            cmd,
            format!(
                "vlib {0} && sleep 2 && vmap work {0} && \
                 vcom -work work {1}/mixer.vhd {1}/tb_mixer.vhd && \
                 vsim -64 -batch -t 1ps -voptargs=+acc work.tb_mixer -do \"run -all; quit;\"",
                work, src
            )
        );
    }

    #[test]
    fn ut_interactive_skips_quit_and_submission() {
        let (_dir, session, profile) = fixture();
        let registry = Registry::new(&session);
        let cmd = build_command(
            &session,
            &profile,
            &[],
            &Vec::new(),
            &registry,
            Mode::Interactive,
            Some("bsub -q normal"),
        );
        assert_eq!(cmd.contains("bsub"), false);
        assert_eq!(cmd.contains("-do"), false);
        assert_eq!(cmd.contains("-novopt"), true);
        assert_eq!(cmd.ends_with("work.tb_mixer"), true);
    }

    #[test]
    fn ut_submission_prefixes_batch_invocation() {
        let (_dir, session, profile) = fixture();
        let registry = Registry::new(&session);
        let cmd = build_command(
            &session,
            &profile,
            &[],
            &Vec::new(),
            &registry,
            Mode::Batch,
            Some("bsub -q normal"),
        );
        assert_eq!(cmd.contains("&& bsub -q normal vsim -64 -batch"), true);
    }

    #[test]
    fn ut_generics_follow_given_order() {
        let (_dir, session, profile) = fixture();
        let registry = Registry::new(&session);
        let generics: Generics = vec![
            (String::from("g_Rs"), String::from("100000000")),
            (String::from("g_depth"), String::from("16")),
        ];
        let cmd = build_command(&session, &profile, &[], &generics, &registry, Mode::Batch, None);
        assert_eq!(cmd.contains("-g g_Rs=100000000 -g g_depth=16"), true);
    }

    #[test]
    fn ut_module_files_resolve_under_src() {
        let (_dir, session, profile) = fixture();
        let registry = Registry::new(&session);
        let modules = vec![String::from("fifo.vhd"), String::from("cordic.vhd")];
        let cmd = build_command(&session, &profile, &modules, &Vec::new(), &registry, Mode::Batch, None);
        let src = session.get_src_path().display().to_string();
        assert_eq!(
            cmd.contains(&format!(
                "{0}/tb_mixer.vhd {0}/fifo.vhd {0}/cordic.vhd",
                src
            )),
            true
        );
    }

    #[test]
    fn ut_deterministic_for_identical_inputs() {
        let (_dir, session, profile) = fixture();
        let mut registry = Registry::new(&session);
        registry
            .register("stim", Direction::Output, Kind::Data, false)
            .unwrap();
        registry
            .register("resp", Direction::Output, Kind::Data, false)
            .unwrap();
        let generics: Generics = vec![(String::from("g_N"), String::from("4"))];
        let a = build_command(&session, &profile, &[], &generics, &registry, Mode::Batch, None);
        let b = build_command(&session, &profile, &[], &generics, &registry, Mode::Batch, None);
        assert_eq!(a, b);
        // file params bind each registered descriptor exactly once
        let stim_param = registry.get("stim").unwrap().get_sim_param().to_string();
        let resp_param = registry.get("resp").unwrap().get_sim_param().to_string();
        assert_eq!(a.matches(&stim_param).count(), 1);
        assert_eq!(a.matches(&resp_param).count(), 1);
    }
}
