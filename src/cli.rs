use clap::{crate_version,Arg,ArgAction,Command,ValueHint};

pub fn build_cli() -> Command {
    let long_help = "dskdav projects Apple DOS 3.3 disk images as a virtual filesystem:
each disk becomes a folder of its cataloged files, locks appear as
`NAME,locked` pseudo-files, deleted files as `_NAME.garbage`, and the
`_dos` folder carries rendered CATALOG.txt and VTOC.txt reports.
Set RUST_LOG environment variable to control logging level.
  levels: trace,debug,info,warn,error

Examples:
---------
list a disk:        `dskdav ls -d mydisk.dsk -f /mydisk`
print the catalog:  `dskdav catalog -d mydisk.dsk`
read a file:        `dskdav get -d mydisk.dsk -f /mydisk/HELLO > hello.bin`
lock a file:        `dskdav lock -d mydisk.dsk -f /mydisk/HELLO`
recoverable delete: `dskdav delete -d mydisk.dsk -f /mydisk/HELLO`";

    let dimg_arg = Arg::new("dimg").short('d').long("dimg").help("path to a disk image, repeat to project several")
        .value_name("PATH")
        .value_hint(ValueHint::FilePath)
        .action(ArgAction::Append)
        .required(true);

    let file_arg_req = Arg::new("file").short('f').long("file").help("path inside the projected tree")
        .value_name("PATH")
        .required(true);

    let file_arg_opt = Arg::new("file").short('f').long("file").help("path inside the projected tree")
        .value_name("PATH")
        .required(false);

    let mut main_cmd = Command::new("dskdav")
        .about("Projects DOS 3.3 disk images as a browsable, writable filesystem.")
        .after_long_help(long_help)
        .version(crate_version!());

    main_cmd = main_cmd.subcommand(
        Command::new("ls")
            .arg(dimg_arg.clone())
            .arg(file_arg_opt.clone())
            .about("list a folder of the projected tree, root by default")
    );
    main_cmd = main_cmd.subcommand(
        Command::new("catalog")
            .arg(dimg_arg.clone())
            .visible_alias("cat")
            .about("write each disk's CATALOG report to stdout")
    );
    main_cmd = main_cmd.subcommand(
        Command::new("vtoc")
            .arg(dimg_arg.clone())
            .about("write each disk's VTOC report to stdout")
    );
    main_cmd = main_cmd.subcommand(
        Command::new("get")
            .arg(dimg_arg.clone())
            .arg(file_arg_req.clone())
            .about("read a projected file, write to stdout")
    );
    main_cmd = main_cmd.subcommand(
        Command::new("lock")
            .arg(dimg_arg.clone())
            .arg(file_arg_req.clone())
            .about("write protect a file by creating its lock marker")
    );
    main_cmd = main_cmd.subcommand(
        Command::new("unlock")
            .arg(dimg_arg.clone())
            .arg(file_arg_req.clone())
            .about("remove write protection by deleting the lock marker")
    );
    main_cmd = main_cmd.subcommand(
        Command::new("delete")
            .arg(dimg_arg.clone())
            .arg(file_arg_req.clone())
            .visible_alias("del")
            .visible_alias("era")
            .about("tombstone a file the way DOS DELETE did; data stays recoverable")
    );
    main_cmd
}
