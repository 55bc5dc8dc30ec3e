use crc::{Crc, CRC_16_XMODEM};

const CRC_XMODEM: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

pub fn frame_checksum(frame: &[u8]) -> u16 {
    let mut digester = CRC_XMODEM.digest();
    digester.update(frame);
    digester.finalize()
}
