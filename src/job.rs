//! Job object tying the child's lifetime to the launcher's.
//!
//! When the last handle to the job closes, every process still in it is
//! terminated. The launcher holds the only handle, so the OS closes it when
//! the launcher dies for any reason and the child tree goes with it.

use windows::core::PCWSTR;
use windows::Win32::Foundation::HANDLE;
use windows::Win32::System::JobObjects::{
    AssignProcessToJobObject, CreateJobObjectW, JobObjectBasicProcessIdList,
    JobObjectExtendedLimitInformation, QueryInformationJobObject, SetInformationJobObject,
    JOBOBJECT_EXTENDED_LIMIT_INFORMATION, JOB_OBJECT_LIMIT, JOB_OBJECT_LIMIT_BREAKAWAY_OK,
    JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE,
};

use crate::error::LaunchError;
use crate::handle::OwnedHandle;

/// Kill on close. Processes started by the child stay in the job unless
/// they are created with `CREATE_BREAKAWAY_FROM_JOB`.
pub const LIMIT_FLAGS: JOB_OBJECT_LIMIT =
    JOB_OBJECT_LIMIT(JOB_OBJECT_LIMIT_KILL_ON_JOB_CLOSE.0 | JOB_OBJECT_LIMIT_BREAKAWAY_OK.0);

const MAX_LISTED: usize = 64;

/// `JOBOBJECT_BASIC_PROCESS_ID_LIST` with room for more than one id.
#[repr(C)]
struct ProcessIdList {
    assigned: u32,
    listed: u32,
    ids: [usize; MAX_LISTED],
}

#[derive(Debug)]
pub struct JobGuard {
    handle: OwnedHandle,
}

impl JobGuard {
    pub fn create() -> Result<Self, LaunchError> {
        let raw = unsafe { CreateJobObjectW(None, PCWSTR::null()) }.map_err(LaunchError::JobObject)?;
        let handle = OwnedHandle::new(raw).ok_or_else(|| {
            LaunchError::JobObject(windows::core::Error::from_win32())
        })?;

        let mut info = JOBOBJECT_EXTENDED_LIMIT_INFORMATION::default();
        info.BasicLimitInformation.LimitFlags = LIMIT_FLAGS;
        unsafe {
            SetInformationJobObject(
                handle.raw(),
                JobObjectExtendedLimitInformation,
                &info as *const _ as *const core::ffi::c_void,
                std::mem::size_of::<JOBOBJECT_EXTENDED_LIMIT_INFORMATION>() as u32,
            )
        }
        .map_err(LaunchError::JobObject)?;

        tracing::debug!("job object armed");
        Ok(Self { handle })
    }

    pub fn assign(&self, process: HANDLE) -> Result<(), LaunchError> {
        unsafe { AssignProcessToJobObject(self.handle.raw(), process) }
            .map_err(LaunchError::JobObject)
    }

    /// Ids of the processes currently in the job, the child and whatever it
    /// started. At most the first 64 are listed.
    pub fn process_ids(&self) -> Result<Vec<u32>, LaunchError> {
        let mut list = ProcessIdList {
            assigned: 0,
            listed: 0,
            ids: [0; MAX_LISTED],
        };
        unsafe {
            QueryInformationJobObject(
                self.handle.raw(),
                JobObjectBasicProcessIdList,
                &mut list as *mut _ as *mut core::ffi::c_void,
                std::mem::size_of::<ProcessIdList>() as u32,
                None,
            )
        }
        .map_err(LaunchError::JobObject)?;

        let listed = (list.listed as usize).min(MAX_LISTED);
        Ok(list.ids[..listed].iter().map(|&id| id as u32).collect())
    }
}
