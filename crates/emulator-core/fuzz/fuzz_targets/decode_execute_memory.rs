#![no_main]

use a64_core::{
    disassemble_word, step_one, validate_data_access, validate_fetch_access, CoreConfig,
    CoreState, DecodedInstruction, Decoder, GpioPeripheral,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 13 {
        return;
    }

    let word = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let addr = u64::from_le_bytes([
        data[4], data[5], data[6], data[7], data[8], data[9], data[10], data[11],
    ]);
    let width = usize::from(data[12] % 9);

    let decoded = Decoder::decode(word);
    if !matches!(decoded, DecodedInstruction::Unknown(_)) {
        assert_eq!(decoded.encode(), word);
    }
    let _ = disassemble_word(word);

    let (mut state, _) = CoreState::with_image(&data[..4]);
    let mut gpio = GpioPeripheral::new();
    let _ = step_one(&mut state, &mut gpio, &CoreConfig::default());

    let _ = validate_fetch_access(addr);
    let _ = validate_data_access(addr, width);
});
