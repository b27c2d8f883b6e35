//! List the contents of an MFS disk image: volume name, every directory
//! record, and (if a header offset skip is needed) the raw byte offset it
//! was found at.
use std::env;
use std::process::ExitCode;

use mfsrust::{open_file, OpenFlags};

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("usage: mfsdump /path/to/image.img [base_offset]");
        return ExitCode::FAILURE;
    }

    let base_offset: u64 = args.get(2).map(|s| s.parse().unwrap_or(0)).unwrap_or(0);

    let vol = match open_file(&args[1], base_offset, OpenFlags::empty()) {
        Ok(vol) => vol,
        Err(e) => {
            eprintln!("failed to open {}: {e}", args[1]);
            return ExitCode::FAILURE;
        }
    };

    let mdb = vol.mdb();
    println!(
        "volume {:?}: {} files, {} alloc blocks of {} bytes",
        String::from_utf8_lossy(mfsrust::pascal::payload(&mdb.volume_name)),
        mdb.file_count,
        mdb.num_alloc_blocks,
        mdb.alloc_block_size,
    );

    for rec in vol.directory() {
        println!(
            "  data={:<8} rsrc={:<8} {:?}",
            rec.data_logical_eof,
            rec.resource_logical_eof,
            String::from_utf8_lossy(rec.name_bytes()),
        );
    }

    if let Err(e) = vol.close() {
        eprintln!("warning: {e}");
    }

    ExitCode::SUCCESS
}
