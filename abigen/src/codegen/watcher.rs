/* Multiplexing watcher generation
 *
 * For a contract with events, emits `{Contract}Watcher<B>` holding several
 * bound instances of the same interface. Each `watch_*` method fans the
 * subscription out to every instance through `rt::watch_all`, which owns
 * the per-call subscription list, merges the streams into one sink and
 * tears everything down on quit, error or a closed sink. A watcher keeps
 * no subscription state of its own, so concurrent watch calls share
 * nothing. */

use crate::codegen::emit::{event_record_name, render_filter_params, watcher_name};
use crate::error::Result;
use crate::model::{ContractSpec, StructTable};
use abigen_types::Param;
use std::fmt::Write;

pub fn emit_watcher(out: &mut String, contract: &ContractSpec, structs: &StructTable) -> Result<()> {
    let name = &contract.type_name;
    let watcher = watcher_name(name);

    writeln!(out)?;
    writeln!(
        out,
        "    /// {} watches events across several `{}` instances at once.",
        watcher, name
    )?;
    writeln!(out, "    pub struct {}<B> {{", watcher)?;
    writeln!(out, "        contracts: Vec<{}<B>>,", name)?;
    writeln!(out, "    }}")?;

    writeln!(out, "    impl<B> Clone for {}<B> {{", watcher)?;
    writeln!(out, "        fn clone(&self) -> Self {{")?;
    writeln!(out, "            Self {{ contracts: self.contracts.clone() }}")?;
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;

    writeln!(out, "    impl<B: rt::ContractBackend> {}<B> {{", watcher)?;
    writeln!(out, "        pub fn new(contracts: Vec<{}<B>>) -> Self {{", name)?;
    writeln!(out, "            Self {{ contracts }}")?;
    writeln!(out, "        }}")?;
    writeln!(out, "        pub fn contracts(&self) -> &[{}<B>] {{", name)?;
    writeln!(out, "            &self.contracts")?;
    writeln!(out, "        }}")?;

    for event in contract.events.values() {
        let record = event_record_name(name, &event.normalized.name);
        let indexed: Vec<&Param> = event.normalized.indexed_inputs().collect();
        let filters = render_filter_params(&indexed, structs)?;
        let clones: String = indexed
            .iter()
            .map(|param| format!(", {}.clone()", param.name))
            .collect();

        writeln!(
            out,
            "        /// Subscribes every instance to `{}` and merges the events into `sink`.",
            event.original.signature()
        )?;
        writeln!(
            out,
            "        ///\n        /// If any subscription fails, the ones already opened are closed before the error is returned."
        )?;
        writeln!(
            out,
            "        pub async fn {}(&self, opts: &rt::WatchOpts, sink: rt::mpsc::Sender<{}>{}) -> rt::Result<rt::Subscription> {{",
            event.watch_name(),
            record,
            filters
        )?;
        writeln!(
            out,
            "            rt::watch_all(&self.contracts, sink, move |instance, forward| instance.{}(opts, forward{})).await",
            event.watch_name(),
            clones
        )?;
        writeln!(out, "        }}")?;
    }

    writeln!(out, "    }}")?;
    Ok(())
}
