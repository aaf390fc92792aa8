extern crate ffmpeg_next as ffmpeg;

use std::fmt;
use std::io;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use color_eyre::eyre::{self, Context};
use ffmpeg::codec::Context as CodecContext;
use ffmpeg::decoder::Video as DecoderVideo;
use ffmpeg::format::context::Input as FormatContext;
use ffmpeg::format::{input_with_dictionary, Pixel};
use ffmpeg::frame::Video as FrameVideo;
use ffmpeg::media::Type;
use ffmpeg::software::scaling::context::Context as ScalingContext;
use ffmpeg::util::log as ffmpeglog;
use ffmpeg::{Dictionary, Packet as CodecPacket, Rational, Rescale};
use ffmpeg_sys_next::{AV_NOPTS_VALUE, AV_TIME_BASE_Q};
use image::RgbImage;

use crate::extraction::ExtractError;
use crate::frame::{FrameRate, Timestamp};
use crate::source::VideoSource;

pub type Result<T> = eyre::Result<T>;

static FFMPEG_INITIALIZED: OnceLock<std::result::Result<(), ffmpeg::Error>> =
    OnceLock::new();

/// Decodes frames out of a video file. The file is closed when this is dropped.
pub struct FrameExtractor {
    // ffmpeg contexts
    ictx: FormatContext,
    decoder: DecoderVideo,
    converter: ScalingContext,

    // internal timestamp bookkeeping, in the stream's timebase
    seek_target_timestamp: i64,
    cur_timestamp: i64,

    // constants/metadata
    end_timestamp: i64,
    first_timestamp: i64,
    timebase: Rational,
    frame_rate: Rational,
    video_stream_index: usize,
    orientation: Orientation,
}

impl FrameExtractor {
    /// Like [`FrameExtractor::new`], but reports failures as an unavailable source.
    pub fn open(path: impl AsRef<Path>) -> std::result::Result<Self, ExtractError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ExtractError::SourceUnavailable(
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("video file not found at {}", path.display()),
                )
                .into(),
            ));
        }

        Self::new(path).map_err(|e| ExtractError::SourceUnavailable(e.into()))
    }

    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        if let Err(e) = FFMPEG_INITIALIZED.get_or_init(|| {
            ffmpeg::init()?;
            ffmpeglog::set_level(ffmpeglog::Level::Warning);
            Ok(())
        }) {
            return Err(e).wrap_err("Failed to initialize ffmpeg");
        }

        let options = {
            let mut options = Dictionary::new();
            options.set("analyzeduration", "10M");
            options.set("probesize", "5M"); // this is the default
            options
        };
        let mut ictx =
            input_with_dictionary(&path, options).wrap_err("Failed to open the file")?;

        let video = ictx
            .streams()
            .best(Type::Video)
            .ok_or(eyre::eyre!("No video stream"))?;

        let video_stream_index = video.index();
        eyre::ensure!(
            video.start_time() != AV_NOPTS_VALUE,
            "Does not have a start time"
        );
        let first_timestamp = video.start_time();
        let timebase = video.time_base();
        let duration = if video.duration() == AV_NOPTS_VALUE {
            eyre::ensure!(
                ictx.duration() != AV_NOPTS_VALUE,
                "Does not have a duration"
            );
            ictx.duration().rescale(AV_TIME_BASE_Q, timebase)
        } else {
            video.duration()
        };
        eyre::ensure!(duration >= 0, "The duration is negative");
        let end_timestamp = first_timestamp + duration;

        // avg_frame_rate is what most containers fill in, r_frame_rate is a guess by
        // libavformat
        let frame_rate = match video.avg_frame_rate() {
            rate if rate.numerator() > 0 && rate.denominator() > 0 => rate,
            _ => video.rate(),
        };

        let orientation = match get_orientation(&video) {
            Some(x) => x,
            None => {
                log::warn!("Got a weird orientation angle, ignoring");
                Orientation::Normal
            }
        };

        let decoder = CodecContext::from_parameters(video.parameters())
            .wrap_err("No codec found")?
            .decoder()
            .video()
            .wrap_err("No codec found, of type video (?)")?;

        let converter = Self::pixel_converter(&decoder)?;

        ictx.streams_mut()
            .filter(|stream| stream.index() != video_stream_index)
            .for_each(|mut stream| stream_set_discard_all(&mut stream));

        let myself = Self {
            ictx,
            decoder,
            video_stream_index,
            converter,
            cur_timestamp: first_timestamp,
            end_timestamp,
            seek_target_timestamp: first_timestamp,
            first_timestamp,
            timebase,
            frame_rate,
            orientation,
        };
        log::debug!(
            "Opened a video of about {}: {:?}",
            humantime::format_duration(myself.approx_length()),
            myself
        );
        Ok(myself)
    }

    fn pixel_converter(decoder: &DecoderVideo) -> Result<ScalingContext> {
        eyre::ensure!(decoder.format() != Pixel::None, "No pixel format");
        Ok(ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            // http://git.videolan.org/?p=ffmpeg.git;a=blob;f=libavutil/pixfmt.h;hb=HEAD
            Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ffmpeg::software::scaling::Flags::FAST_BILINEAR,
        )?)
    }

    /// The next decoded frame at or after the last seek target.
    pub fn next(&mut self) -> Result<Option<RgbImage>> {
        loop {
            loop {
                let mut frame = FrameVideo::empty();
                // avcodec_receive_frame
                // https://ffmpeg.org/doxygen/trunk/group__lavc__decoding.html#ga11e6542c4e66d3028668788a1a74217c
                match self.decoder.receive_frame(&mut frame) {
                    Ok(()) => (),
                    Err(ffmpeg::Error::Other {
                        errno: libc::EAGAIN,
                    }) => break,
                    // End of stream situations.
                    // https://ffmpeg.org/doxygen/trunk/avcodec_8h_source.html
                    Err(ffmpeg::Error::Eof) => return Ok(None),
                    Err(e) => {
                        return Err(e)
                            .wrap_err("Decoder error when receiving a frame from it");
                    }
                }

                if let Some(ts) = frame.timestamp() {
                    self.cur_timestamp = ts;
                } else {
                    log::warn!(
                        "Frame doesn't have a timestamp somewhere after: {}",
                        self.cur_timestamp
                    );
                    continue;
                }

                if self.cur_timestamp < self.seek_target_timestamp {
                    continue;
                }

                let mut converted = FrameVideo::empty();
                self.converter
                    .run(&frame, &mut converted)
                    .wrap_err("Failed to convert the decoded frame")?;
                let img = create_rust_image(converted)?;
                return Ok(Some(undo_rotation(img, self.orientation)));
            }

            loop {
                // http://ffmpeg.org/doxygen/trunk/group__lavf__decoding.html#ga4fdb3084415a82e3810de6ee60e46a61
                let mut packet = CodecPacket::empty();
                match packet.read(&mut self.ictx) {
                    Ok(()) if packet.stream() == self.video_stream_index => {
                        match self.decoder.send_packet(&packet) {
                            Ok(()) => break,
                            Err(e) => {
                                log::error!("Failed to decode frame: {}", e);
                                continue;
                            }
                        }
                    }
                    Ok(()) => continue,
                    Err(ffmpeg::Error::Eof) => {
                        self.decoder
                            .send_eof()
                            .wrap_err("Failed to send EOF to the decoder")?;
                        break;
                    }
                    Err(e) => {
                        eyre::bail!("Failed to read a packet from the stream: {e}");
                    }
                }
            }
        }
    }

    /// Seeks to the sample and decodes it. `None` if the sample is past the end.
    pub fn read_sample(&mut self, timestamp: &Timestamp) -> Result<Option<RgbImage>> {
        let target = self.stream_timestamp(timestamp)?;
        if target >= self.end_timestamp {
            return Ok(None);
        }

        self.seek_internal(target)
            .wrap_err_with(|| format!("Failed when seeking to {timestamp}"))?;
        self.next()
    }

    /// Converts a sample timestamp into the timebase of the video stream.
    fn stream_timestamp(&self, timestamp: &Timestamp) -> Result<i64> {
        let index = i64::try_from(timestamp.index()).wrap_err("The index is too large")?;
        let rate = timestamp.rate();
        let frame_duration = Rational::new(rate.denominator(), rate.numerator());
        Ok(self.first_timestamp + index.rescale(frame_duration, self.timebase))
    }

    fn seek_internal(&mut self, target: i64) -> Result<()> {
        let Self {
            ictx,
            video_stream_index,
            decoder,
            seek_target_timestamp,
            ..
        } = self;

        // prefer a keyframe before the target, the frames in between are skipped in
        // `next`
        if let Err(e) = seek(ictx, *video_stream_index, target, i64::MIN, target) {
            log::debug!("No keyframe before {target} ({e}), seeking anywhere");
            seek(ictx, *video_stream_index, target, i64::MIN, i64::MAX)
                .wrap_err("Failed to seek")?;
        }
        decoder.flush();
        *seek_target_timestamp = target;
        Ok(())
    }

    pub fn approx_length(&self) -> Duration {
        let length = (self.end_timestamp - self.first_timestamp)
            .rescale(self.timebase, Rational::new(1, 1000));
        Duration::from_millis(length.try_into().unwrap_or(0))
    }
}

impl VideoSource for FrameExtractor {
    fn frame_rate(&self) -> std::result::Result<FrameRate, ExtractError> {
        FrameRate::new(self.frame_rate.numerator(), self.frame_rate.denominator())
            .map_err(|e| ExtractError::SourceUnavailable(e.into()))
    }

    fn read_at(
        &mut self,
        timestamp: &Timestamp,
    ) -> std::result::Result<Option<RgbImage>, ExtractError> {
        self.read_sample(timestamp)
            .map_err(|e| ExtractError::Decode {
                timestamp: *timestamp,
                source: e.into(),
            })
    }
}

impl Drop for FrameExtractor {
    fn drop(&mut self) {
        log::debug!("Closing the video at {}", self.cur_timestamp);
    }
}

#[derive(Clone, Copy, Debug)]
enum Orientation {
    Normal,
    Left,
    Right,
    Upside,
}

fn get_orientation(video: &ffmpeg::Stream) -> Option<Orientation> {
    for data in video.side_data() {
        if data.kind() != ffmpeg::packet::side_data::Type::DisplayMatrix {
            continue;
        }
        let rot = unsafe {
            ffmpeg_sys_next::av_display_rotation_get(data.data().as_ptr() as *const i32)
        };

        if rot.is_finite() {
            return match rot.round() as i32 {
                -90 => Some(Orientation::Right),
                90 => Some(Orientation::Left),
                0 => Some(Orientation::Normal),
                180 | -180 => Some(Orientation::Upside),
                _ => None,
            };
        }
    }

    Some(Orientation::Normal)
}

fn undo_rotation(img: RgbImage, ori: Orientation) -> RgbImage {
    match ori {
        Orientation::Normal => img,
        Orientation::Right => image::imageops::rotate90(&img),
        Orientation::Left => image::imageops::rotate270(&img),
        Orientation::Upside => image::imageops::rotate180(&img),
    }
}

fn create_rust_image(converted: FrameVideo) -> Result<RgbImage> {
    eyre::ensure!(
        Pixel::RGB24 == converted.format() && converted.planes() == 1,
        "The converted frame is not packed RGB"
    );

    let src_linesize = converted.stride(0);
    let width = converted.width();
    let height = converted.height();
    let data = converted.data(0);
    let trg_linesize = 3 * width as usize;

    // https://stackoverflow.com/a/57666844
    let data = if src_linesize == trg_linesize {
        data.to_vec()
    } else {
        eyre::ensure!(src_linesize >= trg_linesize, "The lines are too short");
        data.chunks(src_linesize)
            .take(height as usize)
            .flat_map(|line| &line[..trg_linesize])
            .copied()
            .collect()
    };

    RgbImage::from_vec(width, height, data)
        .ok_or_else(|| eyre::eyre!("The converted frame is smaller than {width}x{height}"))
}

fn stream_set_discard_all(stream: &mut ffmpeg::StreamMut<'_>) {
    unsafe {
        let ptr = stream.as_mut_ptr();
        if !ptr.is_null() {
            (*ptr).discard = ffmpeg_sys_next::AVDiscard::AVDISCARD_ALL;
        }
    }
}

/// A copy of FormatContext::seek, except that this accepts a stream_index to seek on.
fn seek(
    input: &mut FormatContext,
    stream_index: usize,
    ts: i64,
    min_ts: i64,
    max_ts: i64,
) -> std::result::Result<(), ffmpeg::Error> {
    let stream_index = stream_index
        .try_into()
        .map_err(|_| ffmpeg::Error::StreamNotFound)?;
    unsafe {
        match ffmpeg_sys_next::avformat_seek_file(
            input.as_mut_ptr(),
            stream_index,
            min_ts,
            ts,
            max_ts,
            0,
        ) {
            s if s >= 0 => Ok(()),
            e => Err(ffmpeg::Error::from(e)),
        }
    }
}

impl fmt::Debug for FrameExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            first_timestamp,
            end_timestamp,
            timebase,
            frame_rate,
            cur_timestamp,
            seek_target_timestamp,
            orientation,
            ..
        } = self;

        f.debug_struct("FrameExtractor")
            .field("first_ts", first_timestamp)
            .field("end_ts", end_timestamp)
            .field("cur_ts", cur_timestamp)
            .field(
                "tb",
                &format_args!("{}/{}", timebase.numerator(), timebase.denominator()),
            )
            .field(
                "fps",
                &format_args!("{}/{}", frame_rate.numerator(), frame_rate.denominator()),
            )
            .field("seek_ts", seek_target_timestamp)
            .field("orientation", orientation)
            .finish()
    }
}
