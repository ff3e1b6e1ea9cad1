// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::mem;

use tracing::debug;
use windows::core::{w, HSTRING, PCWSTR};
use windows::Win32::Foundation::CloseHandle;
use windows::Win32::System::Threading::GetProcessId;
use windows::Win32::UI::Shell::{
    IsUserAnAdmin, ShellExecuteExW, SEE_MASK_NOCLOSEPROCESS, SHELLEXECUTEINFOW,
};
use windows::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;

use crate::error::SpawnError;
use crate::launch::LaunchRequest;
use crate::platform::LaunchHandle;

pub(crate) fn is_elevated() -> bool {
    // a failed token query reports FALSE as well
    unsafe { IsUserAnAdmin().as_bool() }
}

pub(crate) fn spawn(request: &LaunchRequest) -> Result<LaunchHandle, SpawnError> {
    let file = HSTRING::from(request.path.as_str());
    let parameters = HSTRING::from(request.arguments.as_str());

    let mut info = SHELLEXECUTEINFOW {
        cbSize: mem::size_of::<SHELLEXECUTEINFOW>() as u32,
        fMask: SEE_MASK_NOCLOSEPROCESS,
        lpVerb: w!("open"),
        lpFile: PCWSTR(file.as_ptr()),
        lpParameters: PCWSTR(parameters.as_ptr()),
        nShow: SW_SHOWNORMAL.0,
        ..Default::default()
    };

    // file and parameters outlive the call, the struct only borrows them
    unsafe { ShellExecuteExW(&mut info) }.map_err(|err| SpawnError::Os(err.message().to_string()))?;

    // the shell may hand the file to an existing process, in which case there is no handle
    let pid = if info.hProcess.is_invalid() {
        None
    } else {
        let pid = unsafe { GetProcessId(info.hProcess) };
        if let Err(err) = unsafe { CloseHandle(info.hProcess) } {
            debug!("failed to close process handle: {}", err);
        }
        Some(pid).filter(|pid| *pid != 0)
    };

    Ok(LaunchHandle { pid })
}
