//! Command-line surface (spec §6 "CLI surface"). The CLI argument parser
//! itself is an external collaborator per the spec; this module defines
//! the contract this core serves and wires it to bpaf.

use bpaf::Bpaf;

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version)]
pub struct LaunchpadArgs {
    #[bpaf(command("dev"))]
    /// Install the current project's dependencies and emit an activation snippet.
    Dev(#[bpaf(external(dev_args))] DevArgs),
    #[bpaf(command("dev:shellcode"))]
    /// Emit the shell integration preamble.
    DevShellcode,
    #[bpaf(command("install"))]
    /// Install one or more package specs directly to a prefix.
    Install(#[bpaf(external(install_args))] InstallArgs),
    #[bpaf(command("update"), command("upgrade"), command("up"))]
    /// Update installed packages.
    Update(#[bpaf(external(update_args))] UpdateArgs),
    #[bpaf(command("self-upgrade"))]
    /// Upgrade the launchpad binary itself.
    SelfUpgrade(#[bpaf(external(self_upgrade_args))] SelfUpgradeArgs),
    #[bpaf(command("clean"))]
    /// Remove installed packages.
    Clean(#[bpaf(external(clean_args))] CleanArgs),
    #[bpaf(command("services"))]
    /// Control supervised services.
    Services(#[bpaf(external(services_args))] ServicesArgs),
}

#[derive(Debug, Clone, Bpaf)]
pub struct DevArgs {
    /// Print the activation snippet suitable for `eval`.
    #[bpaf(long)]
    pub shell: bool,
    #[bpaf(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Bpaf)]
pub struct InstallArgs {
    #[bpaf(positional("SPEC"))]
    pub specs: Vec<String>,
}

#[derive(Debug, Clone, Bpaf)]
pub struct UpdateArgs {
    #[bpaf(positional("NAME"))]
    pub names: Vec<String>,
    #[bpaf(long)]
    pub latest: bool,
    #[bpaf(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Bpaf)]
pub struct SelfUpgradeArgs {
    #[bpaf(long)]
    pub force: bool,
    #[bpaf(long)]
    pub verbose: bool,
    #[bpaf(long, argument("TARGET"))]
    pub target: Option<String>,
    #[bpaf(long, argument("RELEASE"))]
    pub release: Option<String>,
    #[bpaf(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Bpaf)]
pub struct CleanArgs {
    #[bpaf(long)]
    pub keep_global: bool,
    #[bpaf(long)]
    pub dry_run: bool,
    #[bpaf(long)]
    pub force: bool,
    #[bpaf(long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Bpaf)]
pub struct ServicesArgs {
    #[bpaf(external(service_action))]
    pub action: ServiceAction,
    #[bpaf(positional("NAME"), optional)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, Bpaf)]
pub enum ServiceAction {
    #[bpaf(command("start"))]
    Start,
    #[bpaf(command("stop"))]
    Stop,
    #[bpaf(command("restart"))]
    Restart,
    #[bpaf(command("enable"))]
    Enable,
    #[bpaf(command("disable"))]
    Disable,
    #[bpaf(command("status"))]
    Status,
    #[bpaf(command("list"))]
    List,
}
