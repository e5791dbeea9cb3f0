/*
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! invokes the external `cdo` reprojection tool to remap an icosahedral GRIB onto the model's
//! regular lat/lng grid: spawn with `kill_on_drop`, await exit status, map failure to
//! `RegridFailed`.

use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::errors::{Result, WxFetchError};

/// `cdo -f grb2 remap,{description_file},{weights_file} {input} {output}`.
pub async fn regrid_grib (cdo_path: &str, description_file: &Path, weights_file: &Path, input: &Path, output: &Path) -> Result<()> {
    let remap_arg = format!("remap,{},{}", description_file.display(), weights_file.display());

    let mut cmd = Command::new(cdo_path);
    cmd.arg("-f").arg("grb2").arg(remap_arg).arg(input).arg(output);
    cmd.kill_on_drop(true);

    debug!("executing {cmd:?}");

    match cmd.spawn() {
        Ok(mut child) => match child.wait().await {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(WxFetchError::RegridFailed(format!("cdo exited with {status}"))),
            Err(e) => Err(WxFetchError::RegridFailed(e.to_string())),
        },
        Err(e) => Err(WxFetchError::RegridFailed(e.to_string())),
    }
}
