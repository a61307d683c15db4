#![no_main]

use fragviz::event_log::EventLog;
use fragviz::progress::RecordingSink;
use fragviz::sampler;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decoding arbitrary bytes must never panic, and neither may sampling
    // whatever was decoded
    if let Ok((mut log, _warnings)) = EventLog::from_slice(data) {
        let cap = data.first().copied().unwrap_or(0) as usize;
        sampler::sample(&mut log, cap, &mut RecordingSink::new());
        assert!(cap == 0 || log.len() <= cap);
    }
});
