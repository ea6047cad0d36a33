//! Audio monitor stream.
//!
//! Serves the engine's mixed output as an infinite WAV stream over TCP,
//! so the commentary timeline is audible in any media player.

use std::net::SocketAddr;

use anyhow::Result;
use byteorder::{LittleEndian, WriteBytesExt};
use hound::{SampleFormat, WavSpec};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use crate::constants::{BIT_DEPTH, CHANNELS, OUTPUT_SAMPLE_RATE};
use crate::engine::stream::MixOutput;

pub fn init(listen_addr: String, source: MixOutput) {
    tokio::spawn(async move {
        let listener = match TcpListener::bind(&listen_addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to bind audio monitor on {listen_addr}: {e}");
                return;
            }
        };
        info!("Audio monitor listening on {listen_addr}");

        loop {
            let result = accept(&listener, &source).await;

            match result {
                Ok(addr) => info!("Audio monitor client connected from {addr}"),
                Err(e) => warn!("Failed to accept audio monitor client: {e}"),
            }
        }
    });
}

async fn accept(listener: &TcpListener, source: &MixOutput) -> Result<SocketAddr> {
    let (mut stream, addr) = listener.accept().await?;

    let mut source = source.clone();

    tokio::spawn(async move {
        let spec = WavSpec {
            channels: CHANNELS,
            sample_rate: OUTPUT_SAMPLE_RATE,
            bits_per_sample: BIT_DEPTH,
            sample_format: SampleFormat::Int,
        };

        // Writing the wav header first lets players recognize the stream
        let header = spec.into_header_for_infinite_file();
        if let Err(e) = stream.write_all(&header[..]).await {
            warn!("Failed to write wav header: {e}");
            return;
        }

        loop {
            if source.changed().await.is_err() {
                // Engine gone, nothing more to stream
                break;
            }

            let samples = source.borrow_and_update().clone();
            let mut wav_data: Vec<u8> = Vec::with_capacity(samples.len() * 4);

            for (left, right) in samples {
                let _ = WriteBytesExt::write_i16::<LittleEndian>(&mut wav_data, left);
                let _ = WriteBytesExt::write_i16::<LittleEndian>(&mut wav_data, right);
            }

            if let Err(e) = stream.write_all(wav_data.as_slice()).await {
                debug!("Audio monitor client disconnected: {e}");
                break;
            }
        }
    });

    Ok(addr)
}
