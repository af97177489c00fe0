//! Single-stream HTTP GET into a `.part` file.

use std::io;

use super::CurlOptions;
use crate::control::CancelToken;
use crate::retry::{classify_curl_error, classify_http_status, ErrorKind, JobError};
use crate::storage::PartFile;

fn setup_error(e: curl::Error) -> JobError {
    JobError::failed(ErrorKind::Other, anyhow::Error::new(e).context("curl setup"))
}

/// GETs `url` and streams the body into `part`.
///
/// Requires HTTP 200. The transfer is aborted (returning `JobError::Cancelled`)
/// as soon as `cancel` reaches hard exit; a soft cancel lets it finish.
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub(crate) fn download_to(
    url: &str,
    part: &mut PartFile,
    cancel: &CancelToken,
    opts: &CurlOptions,
) -> Result<(), JobError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(setup_error)?;
    easy.follow_location(true).map_err(setup_error)?;
    easy.max_redirections(10).map_err(setup_error)?;
    easy.connect_timeout(opts.connect_timeout).map_err(setup_error)?;
    // Stall detection: abort when below low_speed_limit for low_speed_time.
    easy.low_speed_limit(opts.low_speed_limit).map_err(setup_error)?;
    easy.low_speed_time(opts.low_speed_time).map_err(setup_error)?;
    easy.timeout(opts.timeout).map_err(setup_error)?;
    easy.progress(true).map_err(setup_error)?;

    let mut storage_error: Option<io::Error> = None;
    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| match part.write(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    storage_error = Some(e);
                    Ok(0) // abort transfer
                }
            })
            .map_err(setup_error)?;
        transfer
            .progress_function(|_, _, _, _| !cancel.is_hard_exit())
            .map_err(setup_error)?;
        transfer.perform()
    };

    if let Err(e) = performed {
        if e.is_aborted_by_callback() && cancel.is_hard_exit() {
            return Err(JobError::Cancelled);
        }
        if let Some(io_err) = storage_error {
            return Err(JobError::failed(
                ErrorKind::Storage,
                anyhow::Error::new(io_err).context(format!("writing {}", part.temp_path().display())),
            ));
        }
        let kind = classify_curl_error(&e);
        return Err(JobError::failed(
            kind,
            anyhow::Error::new(e).context(format!("GET {}", url)),
        ));
    }

    let code = easy.response_code().map_err(setup_error)?;
    if code != 200 {
        return Err(JobError::failed(
            classify_http_status(code),
            anyhow::anyhow!("GET {} returned HTTP status {}", url, code),
        ));
    }
    Ok(())
}
