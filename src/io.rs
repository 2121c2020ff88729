//! Read and write netlists to files

mod bench;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub use bench::{read_bench, write_bench, BenchNet};

use crate::error::{Error, Result};
use crate::network::{CustomSymbols, GNet};

fn check_extension(path: &Path) -> Result<()> {
    match path.extension() {
        None => Err(Error::Unsupported(format!(
            "no extension given for {}",
            path.display()
        ))),
        Some(s) if s == "bench" => Ok(()),
        Some(s) => Err(Error::Unsupported(format!(
            "unknown extension {}",
            s.to_string_lossy()
        ))),
    }
}

/// Read a netlist from a file
///
/// Following extensions are supported: .bench
pub fn read_network_file(path: &Path) -> Result<BenchNet> {
    check_extension(path)?;
    let f = File::open(path)?;
    read_bench(f)
}

/// Write a netlist to a file
///
/// Following extensions are supported: .bench
pub fn write_network_file(path: &Path, net: &GNet, symbols: &CustomSymbols) -> Result<()> {
    check_extension(path)?;
    let mut f = BufWriter::new(File::create(path)?);
    write_bench(&mut f, net, symbols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::generators::nary::make_xor;

    #[test]
    fn test_file_roundtrip() {
        let (net, _, _) = make_xor(5);
        let path = std::env::temp_dir().join(format!("gatelec_io_{}.bench", std::process::id()));
        write_network_file(&path, &net, &CustomSymbols::new()).unwrap();
        let bench = read_network_file(&path).unwrap();
        assert_eq!(bench.inputs.len(), 5);
        assert_eq!(bench.outputs.len(), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_extension() {
        let net = GNet::new();
        let path = Path::new("netlist.blif");
        assert!(matches!(
            write_network_file(path, &net, &CustomSymbols::new()),
            Err(Error::Unsupported(_))
        ));
        assert!(matches!(
            read_network_file(Path::new("netlist")),
            Err(Error::Unsupported(_))
        ));
    }
}
