//! Check command implementation.
//!
//! Validates system requirements and configuration.

use herakles_perf_collector::discovery::{discover, SysconfProbe};
use herakles_perf_collector::{Collector, Family, Slot};

use crate::config::{validate_effective_config, Config};
use crate::startup_checks::validate_requirements;

/// Validates system requirements and configuration.
pub fn command_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Herakles Performance Collector - System Check");
    println!("================================================");

    let mut all_ok = true;
    let collector_config = config.collector_config();
    let proc_root = collector_config.proc_root.clone();

    println!("\n📁 Checking counter sources under {}...", proc_root.display());
    match validate_requirements(&proc_root) {
        Ok(_) => println!("   ✅ Required counter sources readable"),
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    println!("\n🖥️  Checking hardware discovery...");
    let probe = SysconfProbe::new(&proc_root);
    match discover(&probe) {
        Ok(info) => {
            println!(
                "   ✅ {} processor(s), {} clock ticks/s",
                info.processor_count, info.clock_tick_rate
            );
            match info.processor_speed_hz {
                Some(hz) => println!("   ✅ Processor speed {:.0} MHz", hz / 1_000_000.0),
                None => println!("   ⚠️  Processor speed unknown"),
            }
        }
        Err(e) => {
            println!("   ❌ Discovery failed: {}", e);
            all_ok = false;
        }
    }

    // One snapshot per family proves the parsers accept this kernel's formats
    if all_ok {
        println!("\n📊 Checking counter acquisition...");
        match Collector::from_config(&collector_config) {
            Ok(mut collector) => {
                for family in Family::ALL {
                    match collector.take_snapshot(family, Slot::First) {
                        Ok(_) => println!("   ✅ {} counters acquired", family),
                        Err(e) => {
                            println!("   ❌ {}", e);
                            all_ok = false;
                        }
                    }
                }
            }
            Err(e) => {
                println!("   ❌ {}", e);
                all_ok = false;
            }
        }
    }

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => {
            println!("   ✅ Configuration is valid");
        }
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - system is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}
