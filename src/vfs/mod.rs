//! # Virtual Filesystem Projection
//!
//! Composes the loaded disks into one tree a transport can browse.  The
//! root holds a folder per disk and a README; each disk folder holds the
//! cataloged files under their path-safe names, a pseudo-file per lock,
//! and a `_dos` folder with the rendered CATALOG and VTOC reports.
//!
//! Names are where DOS and a pathname disagree, so the projection does
//! the arbitration: inverted-video names are mapped through the
//! path-safe form, tombstones are shown as `_NAME.garbage`, and when two
//! projected names land on the same string the later one in catalog
//! order takes a `#N` suffix, assigned the same way on every listing.
//!
//! The only writes that exist are spelled as names too: creating
//! `NAME,locked` locks the file, removing it unlocks, and removing the
//! file itself tombstones the catalog entry.  Everything else is
//! unsupported by construction.

use std::collections::HashMap;
use std::io::SeekFrom;
use std::sync::Arc;
use chrono::{DateTime,Utc};
use log::{debug,info};
use crate::fs::Error;
use crate::fs::dos33::{Disk,CatalogEntry};
use crate::DYNERR;

pub const README_NAME: &str = "README.txt";
pub const DOS_DIR_NAME: &str = "_dos";
pub const CATALOG_NAME: &str = "CATALOG.txt";
pub const VTOC_NAME: &str = "VTOC.txt";
const LOCK_SUFFIX: &str = ",locked";

const README: &str = "DOS 3.3 DSK Filesystem Folder Structure

Each DSK is represented as a folder containing all the files on it.

**Locks**

There are also lock files (ending in \",locked\") which represent the lock
state of the file.
You can delete the lock to unlock a file.
You can create a lock to lock a file.

**Garbage Files**

Files that have been deleted can be viewed as well.
They start with an underscore and end with \".garbage\".

**_dos/**

The _dos directory contains special files and folders.

  CATALOG.txt  a close approximation of running CATALOG from DOS.
  VTOC.txt     Volume Table of Contents information that might be helpful.
";

fn lock_name(filename: &str) -> String {
    format!("{}{}",filename,LOCK_SUFFIX)
}

fn garbage_name(filename: &str) -> String {
    format!("_{}.garbage",filename)
}

fn parse_lock_name(lockfile: &str) -> Option<&str> {
    lockfile.strip_suffix(LOCK_SUFFIX)
}

/// What `stat` and `readdir` report for one node.
#[derive(Clone,Debug)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
    pub mod_time: DateTime<Utc>
}

/// One projected node.  Files carry enough to produce their bytes on
/// demand; directories are realized through `DavFs::children`.
#[derive(Clone)]
pub enum Node {
    Root,
    DiskDir(Arc<Disk>),
    MetaDir(Arc<Disk>),
    MetaFile {
        name: String,
        content: Arc<Vec<u8>>,
        mod_time: DateTime<Utc>
    },
    DiskFile {
        disk: Arc<Disk>,
        entry: CatalogEntry,
        name: String
    },
    LockMarker {
        disk: Arc<Disk>,
        entry: CatalogEntry,
        name: String
    }
}

impl Node {
    pub fn is_dir(&self) -> bool {
        matches!(self,Node::Root | Node::DiskDir(_) | Node::MetaDir(_))
    }
}

/// Outcome of a path walk.  A missing final component at an existing
/// directory is reported with its parent so a create can intercept it;
/// anything missing earlier is simply not found.
enum Walked {
    Found(Node),
    MissingChild {
        parent: Node,
        leaf: String
    }
}

pub enum OpenMode {
    Read,
    Create
}

/// Claim a projected name, appending `#N` while it collides with a name
/// already claimed.  N counts collisions of the wanted name, so the
/// result is the same on every realization of the same catalog.
fn disambiguate(used: &mut HashMap<String,usize>,want: String) -> String {
    if !used.contains_key(&want) {
        used.insert(want.clone(),0);
        return want;
    }
    loop {
        let n = used.get_mut(&want).expect("collision count disappeared");
        *n += 1;
        let candidate = format!("{}#{}",want,n);
        if !used.contains_key(&candidate) {
            used.insert(candidate.clone(),0);
            return candidate;
        }
    }
}

/// The set of loaded disks projected as a tree.  Shared references to
/// the disks are handed to nodes, so handles stay valid however long the
/// transport keeps them.
pub struct DavFs {
    disks: Vec<Arc<Disk>>,
    created: DateTime<Utc>
}

impl DavFs {
    /// Load every image path and project the set.  Any image that fails
    /// to load fails the whole mount; a transport should not come up
    /// with half its disks.
    pub fn new(paths: &[String]) -> Result<Self,DYNERR> {
        let mut disks: Vec<Arc<Disk>> = Vec::new();
        for path in paths {
            let disk = crate::create_fs_from_file(path)?;
            info!("projecting {} as /{}",path,disk.name());
            disks.push(Arc::new(disk));
        }
        Ok(Self {
            disks,
            created: Utc::now()
        })
    }
    /// Project disks that are already open, e.g. images built in memory.
    pub fn from_disks(disks: Vec<Disk>) -> Self {
        Self {
            disks: disks.into_iter().map(Arc::new).collect(),
            created: Utc::now()
        }
    }
    pub fn list_images(&self) -> Vec<String> {
        self.disks.iter().map(|d| d.name().to_string()).collect()
    }
    /// Realize the children of a directory node in their fixed order:
    /// meta entries first, then the catalog in on-disk order.
    fn children(&self,node: &Node) -> Result<Vec<(String,Node)>,DYNERR> {
        match node {
            Node::Root => {
                let mut kids: Vec<(String,Node)> = Vec::new();
                kids.push((README_NAME.to_string(),Node::MetaFile {
                    name: README_NAME.to_string(),
                    content: Arc::new(README.as_bytes().to_vec()),
                    mod_time: self.created
                }));
                for disk in &self.disks {
                    kids.push((disk.name().to_string(),Node::DiskDir(disk.clone())));
                }
                Ok(kids)
            },
            Node::DiskDir(disk) => Self::disk_children(disk),
            Node::MetaDir(disk) => {
                let mut kids: Vec<(String,Node)> = Vec::new();
                kids.push((CATALOG_NAME.to_string(),Node::MetaFile {
                    name: CATALOG_NAME.to_string(),
                    content: Arc::new(disk.catalog_text()?.into_bytes()),
                    mod_time: disk.mod_time()
                }));
                kids.push((VTOC_NAME.to_string(),Node::MetaFile {
                    name: VTOC_NAME.to_string(),
                    content: Arc::new(disk.vtoc_text().into_bytes()),
                    mod_time: disk.mod_time()
                }));
                Ok(kids)
            },
            _ => Err(Box::new(Error::NotADirectory))
        }
    }
    fn disk_children(disk: &Arc<Disk>) -> Result<Vec<(String,Node)>,DYNERR> {
        let mut kids: Vec<(String,Node)> = Vec::new();
        let mut used: HashMap<String,usize> = HashMap::new();
        used.insert(DOS_DIR_NAME.to_string(),0);
        kids.push((DOS_DIR_NAME.to_string(),Node::MetaDir(disk.clone())));
        for entry in disk.catalog()? {
            let base = match entry.is_deleted() {
                true => garbage_name(&entry.name().path_safe()),
                false => entry.name().path_safe()
            };
            let name = disambiguate(&mut used,base);
            kids.push((name.clone(),Node::DiskFile {
                disk: disk.clone(),
                entry: entry.clone(),
                name: name.clone()
            }));
            if entry.is_locked() {
                let marker = disambiguate(&mut used,lock_name(&name));
                kids.push((marker.clone(),Node::LockMarker {
                    disk: disk.clone(),
                    entry,
                    name: marker
                }));
            }
        }
        Ok(kids)
    }
    fn info(&self,node: &Node) -> FileInfo {
        match node {
            Node::Root => FileInfo {
                name: String::new(),
                size: 0,
                is_dir: true,
                mod_time: self.created
            },
            Node::DiskDir(disk) => FileInfo {
                name: disk.name().to_string(),
                size: 0,
                is_dir: true,
                mod_time: disk.mod_time()
            },
            Node::MetaDir(disk) => FileInfo {
                name: DOS_DIR_NAME.to_string(),
                size: 0,
                is_dir: true,
                mod_time: disk.mod_time()
            },
            Node::MetaFile { name, content, mod_time } => FileInfo {
                name: name.clone(),
                size: content.len() as u64,
                is_dir: false,
                mod_time: *mod_time
            },
            Node::DiskFile { disk, entry, name } => FileInfo {
                name: name.clone(),
                // upper bound: sector granularity is all the entry knows
                size: entry.sectors_used() as u64 * 256,
                is_dir: false,
                mod_time: disk.mod_time()
            },
            Node::LockMarker { disk, name, .. } => FileInfo {
                name: name.clone(),
                size: 0,
                is_dir: false,
                mod_time: disk.mod_time()
            }
        }
    }
    /// Descend from the root.  Distinguishes a missing last component at
    /// a live directory from a dead intermediate path, and descending
    /// through a file from either.
    fn walk(&self,path: &str) -> Result<Walked,DYNERR> {
        let trimmed = path.trim_start_matches('/').trim_end_matches('/');
        if trimmed.is_empty() {
            return Ok(Walked::Found(Node::Root));
        }
        let parts: Vec<&str> = trimmed.split('/').collect();
        let mut node = Node::Root;
        for (i,part) in parts.iter().enumerate() {
            let kids = self.children(&node)?;
            match kids.into_iter().find(|(name,_)| name == part) {
                Some((_,child)) => node = child,
                None if i+1 == parts.len() => {
                    return Ok(Walked::MissingChild {
                        parent: node,
                        leaf: part.to_string()
                    });
                },
                None => return Err(Box::new(Error::NotFound))
            }
        }
        Ok(Walked::Found(node))
    }
    /// Open a node for reading, or with `Create`, synthesize a lock: a
    /// missing `NAME,locked` under a disk folder locks the file projected
    /// as `NAME`.  Creating anything else does not exist here.
    pub fn open(&self,path: &str,mode: OpenMode) -> Result<Handle,DYNERR> {
        match self.walk(path)? {
            Walked::Found(node) => Ok(Handle::new(node)),
            Walked::MissingChild { parent, leaf } => match mode {
                OpenMode::Create => self.create_in(parent,&leaf),
                OpenMode::Read => Err(Box::new(Error::NotFound))
            }
        }
    }
    fn create_in(&self,parent: Node,leaf: &str) -> Result<Handle,DYNERR> {
        let disk = match parent {
            Node::DiskDir(disk) => disk,
            _ => return Err(Box::new(Error::Unsupported))
        };
        let base = match parse_lock_name(leaf) {
            Some(base) => base.to_string(),
            None => return Err(Box::new(Error::Unsupported))
        };
        for (name,node) in Self::disk_children(&disk)? {
            if name != base {
                continue;
            }
            if let Node::DiskFile { entry, .. } = node {
                if entry.is_deleted() {
                    break;
                }
                disk.lock(&entry)?;
                debug!("locked {} on {}",base,disk.name());
                return Ok(Handle::new(Node::LockMarker {
                    disk: disk.clone(),
                    entry,
                    name: leaf.to_string()
                }));
            }
        }
        Err(Box::new(Error::Unsupported))
    }
    pub fn stat(&self,path: &str) -> Result<FileInfo,DYNERR> {
        match self.walk(path)? {
            Walked::Found(node) => Ok(self.info(&node)),
            Walked::MissingChild { .. } => Err(Box::new(Error::NotFound))
        }
    }
    /// List a directory handle.
    pub fn readdir(&self,handle: &Handle) -> Result<Vec<FileInfo>,DYNERR> {
        if !handle.node.is_dir() {
            return Err(Box::new(Error::NotADirectory));
        }
        let mut ans: Vec<FileInfo> = Vec::new();
        for (_,child) in self.children(&handle.node)? {
            ans.push(self.info(&child));
        }
        Ok(ans)
    }
    /// Remove a node.  A lock marker unlocks its file; a live disk file
    /// is tombstoned; nothing else can go away.
    pub fn remove(&self,path: &str) -> Result<(),DYNERR> {
        match self.walk(path)? {
            Walked::Found(Node::LockMarker { disk, entry, name }) => {
                disk.unlock(&entry)?;
                debug!("unlocked {} on {}",name,disk.name());
                Ok(())
            },
            Walked::Found(Node::DiskFile { disk, entry, name }) => {
                disk.delete(&entry)?;
                debug!("deleted {} on {}",name,disk.name());
                Ok(())
            },
            Walked::Found(_) => Err(Box::new(Error::Unsupported)),
            Walked::MissingChild { .. } => Err(Box::new(Error::NotFound))
        }
    }
    pub fn mkdir(&self,_path: &str) -> Result<(),DYNERR> {
        Err(Box::new(Error::Unsupported))
    }
    pub fn rename(&self,_from: &str,_to: &str) -> Result<(),DYNERR> {
        Err(Box::new(Error::Unsupported))
    }
}

/// An open node with an independent cursor.  The content is materialized
/// on first read and kept, so a reader streaming a file over many
/// requests sees one consistent snapshot even if the image is mutated
/// in between.
pub struct Handle {
    node: Node,
    pos: u64,
    content: Option<Arc<Vec<u8>>>
}

impl Handle {
    fn new(node: Node) -> Self {
        Self {
            node,
            pos: 0,
            content: None
        }
    }
    pub fn is_dir(&self) -> bool {
        self.node.is_dir()
    }
    fn load(&mut self) -> Result<Arc<Vec<u8>>,DYNERR> {
        if let Some(content) = &self.content {
            return Ok(content.clone());
        }
        let content: Arc<Vec<u8>> = match &self.node {
            Node::MetaFile { content, .. } => content.clone(),
            Node::DiskFile { disk, entry, .. } => Arc::new(disk.read_all(entry)?),
            Node::LockMarker { .. } => Arc::new(Vec::new()),
            _ => return Err(Box::new(Error::Unsupported))
        };
        self.content = Some(content.clone());
        Ok(content)
    }
    /// Read at the cursor.  Returns 0 at end of file.
    pub fn read(&mut self,buf: &mut [u8]) -> Result<usize,DYNERR> {
        let content = self.load()?;
        let pos = usize::min(self.pos as usize,content.len());
        let n = usize::min(buf.len(),content.len()-pos);
        buf[0..n].copy_from_slice(&content[pos..pos+n]);
        self.pos += n as u64;
        Ok(n)
    }
    /// Read the rest of the file from the cursor.
    pub fn read_to_end(&mut self) -> Result<Vec<u8>,DYNERR> {
        let content = self.load()?;
        let pos = usize::min(self.pos as usize,content.len());
        let ans = content[pos..].to_vec();
        self.pos = content.len() as u64;
        Ok(ans)
    }
    /// Move the cursor.  Seeking from the end materializes the content,
    /// since the entry's sector count is only an upper bound on the true
    /// length.
    pub fn seek(&mut self,from: SeekFrom) -> Result<u64,DYNERR> {
        let target = match from {
            SeekFrom::Start(n) => n as i64,
            SeekFrom::Current(n) => self.pos as i64 + n,
            SeekFrom::End(n) => self.load()?.len() as i64 + n
        };
        if target < 0 {
            return Err(Box::new(Error::Io(std::io::Error::from(std::io::ErrorKind::InvalidInput))));
        }
        self.pos = target as u64;
        Ok(self.pos)
    }
    /// The projection has no byte-level writes; mutations are spelled as
    /// create and remove of names.
    pub fn write(&mut self,_buf: &[u8]) -> Result<usize,DYNERR> {
        Err(Box::new(Error::Unsupported))
    }
}
