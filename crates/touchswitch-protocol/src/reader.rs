// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Inbound frame reader
//!
//! Pulls one byte at a time from a [`TimedRead`] link, waiting at most
//! `timeout_ms` per byte, and assembles `[0x7B, L, payload...]` into a
//! [`Frame`]. A failed attempt always leaves the link positioned so the
//! next attempt can resynchronize on a later start byte.

use touchswitch_config::{OverflowPolicy, ProtocolConfig, TimeoutPolicy};
use touchswitch_hal::TimedRead;
use tracing::{debug, trace, warn};

use crate::error::{FrameStage, ReadError};
use crate::frame::{Frame, FRAME_BUFFER_CAPACITY, START_BYTE};

/// Frame reader settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Per-byte timeout
    pub timeout_ms: u32,
    pub timeout_policy: TimeoutPolicy,
    pub overflow_policy: OverflowPolicy,
    /// Check the trailing payload byte against the sum of the others
    pub verify_checksum: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self::from(&ProtocolConfig::default())
    }
}

impl From<&ProtocolConfig> for ReaderOptions {
    fn from(config: &ProtocolConfig) -> Self {
        Self {
            timeout_ms: config.read_timeout_ms,
            timeout_policy: config.timeout_policy,
            overflow_policy: config.overflow_policy,
            verify_checksum: config.verify_inbound_checksum,
        }
    }
}

/// Assembles inbound frames from a byte stream
#[derive(Debug, Clone, Default)]
pub struct FrameReader {
    options: ReaderOptions,
}

impl FrameReader {
    pub fn new(options: ReaderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Read one frame
    ///
    /// Callers should only invoke this when the link reports pending data.
    /// On [`ReadError::Desync`] exactly one byte has been consumed.
    pub fn read_frame<S: TimedRead>(&self, serial: &mut S) -> Result<Frame, ReadError<S::Error>> {
        let start = self.next_byte(serial, FrameStage::StartByte)?;
        if start != START_BYTE {
            trace!("[FRAME-READER] Skipping stray byte 0x{:02X}", start);
            return Err(ReadError::Desync(start));
        }

        let declared = self.next_byte(serial, FrameStage::Length)?;
        if usize::from(declared) > FRAME_BUFFER_CAPACITY {
            return Err(self.overflow(serial, declared)?);
        }

        let mut frame = Frame::default();
        for received in 0..usize::from(declared) {
            let stored = match serial
                .timed_read(self.options.timeout_ms)
                .map_err(ReadError::Transport)?
            {
                Some(byte) => frame.push(byte),
                None => match self.options.timeout_policy {
                    TimeoutPolicy::Sentinel => frame.push_sentinel(),
                    TimeoutPolicy::Abandon => {
                        debug!(
                            "[FRAME-READER] Abandoning frame after {}/{} payload bytes",
                            received, declared
                        );
                        return Err(ReadError::Timeout(FrameStage::Payload { received }));
                    }
                },
            };
            // Length was checked against capacity above
            debug_assert!(stored);
        }

        if frame.timed_out_bytes() > 0 {
            debug!(
                "[FRAME-READER] {} of {} payload bytes timed out, filled with 0xFF",
                frame.timed_out_bytes(),
                declared
            );
        }

        if self.options.verify_checksum {
            if let Some((carried, computed)) = frame.trailing_checksum() {
                if carried != computed {
                    debug!(
                        "[FRAME-READER] Checksum mismatch: carried 0x{:02X}, computed 0x{:02X}",
                        carried, computed
                    );
                    return Err(ReadError::ChecksumMismatch { carried, computed });
                }
            }
        }

        trace!("[FRAME-READER] Frame: {:02X?}", frame.payload());
        Ok(frame)
    }

    fn next_byte<S: TimedRead>(
        &self,
        serial: &mut S,
        stage: FrameStage,
    ) -> Result<u8, ReadError<S::Error>> {
        serial
            .timed_read(self.options.timeout_ms)
            .map_err(ReadError::Transport)?
            .ok_or(ReadError::Timeout(stage))
    }

    /// Handle a declared length larger than the buffer; never stores a byte
    fn overflow<S: TimedRead>(
        &self,
        serial: &mut S,
        declared: u8,
    ) -> Result<ReadError<S::Error>, ReadError<S::Error>> {
        let mut drained = 0;
        if self.options.overflow_policy == OverflowPolicy::Drain {
            while drained < usize::from(declared) {
                match serial
                    .timed_read(self.options.timeout_ms)
                    .map_err(ReadError::Transport)?
                {
                    Some(_) => drained += 1,
                    None => break,
                }
            }
        }
        warn!(
            "[FRAME-READER] Declared length {} exceeds capacity {}, drained {} bytes",
            declared, FRAME_BUFFER_CAPACITY, drained
        );
        Ok(ReadError::LengthOverflow {
            declared,
            capacity: FRAME_BUFFER_CAPACITY,
            drained,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use touchswitch_hal::{MemorySerial, MemorySerialError, SerialIO};

    fn reader() -> FrameReader {
        FrameReader::default()
    }

    fn abandoning() -> FrameReader {
        FrameReader::new(ReaderOptions {
            timeout_policy: TimeoutPolicy::Abandon,
            overflow_policy: OverflowPolicy::Abandon,
            ..ReaderOptions::default()
        })
    }

    #[test]
    fn test_default_options_follow_protocol_defaults() {
        let options = ReaderOptions::default();
        assert_eq!(options.timeout_ms, 300);
        assert_eq!(options.timeout_policy, TimeoutPolicy::Sentinel);
        assert_eq!(options.overflow_policy, OverflowPolicy::Drain);
        assert!(!options.verify_checksum);
    }

    #[test]
    fn test_reads_complete_frame() {
        let mut serial = MemorySerial::with_rx(&[0x7B, 0x04, 0x04, 0x03, 0x01, 0x08]);
        let frame = reader().read_frame(&mut serial).unwrap();
        assert_eq!(frame.payload(), &[0x04, 0x03, 0x01, 0x08]);
        assert_eq!(frame.timed_out_bytes(), 0);
        assert_eq!(serial.rx_pending(), 0);
    }

    #[test]
    fn test_leaves_following_frame_untouched() {
        let mut serial =
            MemorySerial::with_rx(&[0x7B, 0x02, 0xAA, 0xBB, 0x7B, 0x01, 0xCC]);
        assert_eq!(reader().read_frame(&mut serial).unwrap().payload(), &[0xAA, 0xBB]);
        assert_eq!(serial.rx_pending(), 3);
        assert_eq!(reader().read_frame(&mut serial).unwrap().payload(), &[0xCC]);
    }

    #[test]
    fn test_desync_consumes_one_byte() {
        let mut serial = MemorySerial::with_rx(&[0x00, 0x7B, 0x01, 0x04]);
        assert!(matches!(
            reader().read_frame(&mut serial),
            Err(ReadError::Desync(0x00))
        ));
        assert_eq!(serial.bytes_consumed(), 1);
        assert_eq!(reader().read_frame(&mut serial).unwrap().payload(), &[0x04]);
    }

    #[test]
    fn test_missing_length_byte() {
        let mut serial = MemorySerial::with_rx(&[0x7B]);
        assert!(matches!(
            reader().read_frame(&mut serial),
            Err(ReadError::Timeout(FrameStage::Length))
        ));
    }

    #[test]
    fn test_sentinel_fills_missing_payload() {
        // Declares 4 bytes, only 3 arrive
        let mut serial = MemorySerial::with_rx(&[0x7B, 0x04, 0x04, 0x03, 0x01]);
        let frame = reader().read_frame(&mut serial).unwrap();
        assert_eq!(frame.payload(), &[0x04, 0x03, 0x01, 0xFF]);
        assert_eq!(frame.timed_out_bytes(), 1);
    }

    #[test]
    fn test_abandon_policy_drops_partial_frame() {
        let mut serial = MemorySerial::with_rx(&[0x7B, 0x04, 0x04, 0x03, 0x01]);
        assert!(matches!(
            abandoning().read_frame(&mut serial),
            Err(ReadError::Timeout(FrameStage::Payload { received: 3 }))
        ));
    }

    #[test]
    fn test_zero_length_frame() {
        let mut serial = MemorySerial::with_rx(&[0x7B, 0x00]);
        let frame = reader().read_frame(&mut serial).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn test_overflow_drains_declared_bytes() {
        let mut bytes = vec![0x7B, 200];
        bytes.extend(std::iter::repeat(0x11).take(200));
        bytes.extend([0x7B, 0x01, 0x04]);
        let mut serial = MemorySerial::with_rx(&bytes);

        match reader().read_frame(&mut serial) {
            Err(ReadError::LengthOverflow {
                declared,
                capacity,
                drained,
            }) => {
                assert_eq!(declared, 200);
                assert_eq!(capacity, FRAME_BUFFER_CAPACITY);
                assert_eq!(drained, 200);
            }
            other => panic!("expected overflow, got {:?}", other),
        }
        assert_eq!(reader().read_frame(&mut serial).unwrap().payload(), &[0x04]);
    }

    #[test]
    fn test_overflow_abandon_reads_nothing_more() {
        let mut serial = MemorySerial::with_rx(&[0x7B, 129, 0x01, 0x02]);
        assert!(matches!(
            abandoning().read_frame(&mut serial),
            Err(ReadError::LengthOverflow { drained: 0, .. })
        ));
        assert_eq!(serial.rx_pending(), 2);
    }

    #[test]
    fn test_exact_capacity_accepted() {
        let mut bytes = vec![0x7B, FRAME_BUFFER_CAPACITY as u8];
        bytes.extend(std::iter::repeat(0x22).take(FRAME_BUFFER_CAPACITY));
        let mut serial = MemorySerial::with_rx(&bytes);
        assert_eq!(reader().read_frame(&mut serial).unwrap().len(), FRAME_BUFFER_CAPACITY);
    }

    #[test]
    fn test_checksum_verification() {
        let strict = FrameReader::new(ReaderOptions {
            verify_checksum: true,
            ..ReaderOptions::default()
        });

        let mut serial = MemorySerial::with_rx(&[0x7B, 0x04, 0x04, 0x03, 0x01, 0x08]);
        assert!(strict.read_frame(&mut serial).is_ok());

        let mut serial = MemorySerial::with_rx(&[0x7B, 0x04, 0x04, 0x03, 0x01, 0x09]);
        assert!(matches!(
            strict.read_frame(&mut serial),
            Err(ReadError::ChecksumMismatch {
                carried: 0x09,
                computed: 0x08
            })
        ));
    }

    #[test]
    fn test_transport_error_propagates() {
        let mut serial = MemorySerial::with_rx(&[0x7B]);
        serial.close();
        assert!(matches!(
            reader().read_frame(&mut serial),
            Err(ReadError::Transport(MemorySerialError::Closed))
        ));
        assert!(serial.available().is_err());
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_capacity(bytes in prop::collection::vec(any::<u8>(), 0..600)) {
            let mut serial = MemorySerial::with_rx(&bytes);
            let reader = reader();
            let mut attempts = 0;
            while serial.rx_pending() > 0 && attempts < 1000 {
                if let Ok(frame) = reader.read_frame(&mut serial) {
                    prop_assert!(frame.len() <= FRAME_BUFFER_CAPACITY);
                }
                attempts += 1;
            }
            prop_assert_eq!(serial.rx_pending(), 0);
        }

        #[test]
        fn prop_garbage_prefix_then_frame(garbage in prop::collection::vec(0u8..0x7B, 0..32)) {
            let mut bytes = garbage.clone();
            bytes.extend([0x7B, 0x03, 0x04, 0x02, 0x01]);
            let mut serial = MemorySerial::with_rx(&bytes);
            let reader = reader();
            for _ in 0..garbage.len() {
                prop_assert!(matches!(reader.read_frame(&mut serial), Err(ReadError::Desync(_))));
            }
            let frame = reader.read_frame(&mut serial).unwrap();
            prop_assert_eq!(frame.payload(), &[0x04, 0x02, 0x01][..]);
        }
    }
}
