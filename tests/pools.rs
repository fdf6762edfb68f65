#![cfg(feature="db-tests")]

mod tests {
    use ora::*;
    use std::time::Duration;

    fn cfgs() -> (SrvCfg, SesCfg) {
        let dbname = std::env::var("DBNAME").expect("database name");
        let dbuser = std::env::var("DBUSER").expect("user name");
        let dbpass = std::env::var("DBPASS").expect("password");
        (SrvCfg::new(&dbname), SesCfg::new(&dbuser, &dbpass))
    }

    #[test]
    fn sessions_are_reused() -> Result<()> {
        let (srv_cfg, ses_cfg) = cfgs();
        let env = drv().open_env()?;
        let pool = Pool::new(&env, srv_cfg, ses_cfg, 2);

        let ses = pool.get()?;
        let id = ses.id();
        pool.put(ses);
        assert_eq!(pool.num_idle_ses(), 1);

        let ses = pool.get()?;
        assert_eq!(ses.id(), id);
        assert_eq!(ses.num_stmt(), 0);
        assert_eq!(ses.num_tx(), 0);
        pool.put(ses);

        pool.close()?;
        assert_eq!(pool.num_idle_ses(), 0);
        assert_eq!(env.num_srv(), 0);
        Ok(())
    }

    #[test]
    fn evicted_sessions_park_their_servers() -> Result<()> {
        let (srv_cfg, ses_cfg) = cfgs();
        let env = drv().open_env()?;
        let pool = Pool::new(&env, srv_cfg, ses_cfg, 2);
        pool.set_idle_timeout(Duration::from_millis(0));

        let ses = pool.get()?;
        pool.put(ses);
        std::thread::sleep(Duration::from_millis(10));
        pool.evict();
        assert_eq!(pool.num_idle_ses(), 0);
        assert_eq!(pool.num_idle_srv(), 1);

        pool.set_idle_timeout(Duration::from_secs(60));
        let ses = pool.get()?;
        ses.ping()?;
        assert_eq!(pool.num_idle_srv(), 0);
        pool.put(ses);
        Ok(())
    }

    #[test]
    fn closed_sessions_are_not_pooled() -> Result<()> {
        let (srv_cfg, ses_cfg) = cfgs();
        let env = drv().open_env()?;
        let srv = env.open_srv(&srv_cfg)?;
        let pool = SesPool::new(&srv, ses_cfg, 0);

        let ses = pool.get()?;
        ses.close()?;
        pool.put(ses);
        assert_eq!(pool.num_idle(), 0);

        let ses = pool.get()?;
        assert!(ses.is_open());
        pool.put(ses);
        assert_eq!(pool.num_idle(), 1);
        pool.close()?;
        assert_eq!(srv.num_ses(), 0);
        assert!(srv.is_open());
        Ok(())
    }

    #[test]
    fn server_pool() -> Result<()> {
        let (srv_cfg, _) = cfgs();
        let env = drv().open_env()?;
        let pool = SrvPool::new(&env, srv_cfg, 1);

        let s1 = pool.get()?;
        let s2 = pool.get()?;
        let (id1, id2) = (s1.id(), s2.id());
        assert_ne!(id1, id2);
        pool.put(s1);
        pool.put(s2);
        assert_eq!(pool.num_idle(), 1);
        assert_eq!(env.num_srv(), 1);
        assert_eq!(pool.get()?.id(), id2);
        Ok(())
    }
}
